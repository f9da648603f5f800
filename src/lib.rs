pub mod accumulator;
pub mod active_users;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod parse;
pub mod report;
pub mod rolling;
pub mod scan;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::sync::Arc;

use tracing::info;

use active_users::read_active_users;
use config::{Config, ScanOptions, SortOrder};
use engine::join_transactions;
use error::Result;
use models::JoinResult;
use report::write_report;
use rolling::{write_rolling_rows, RollingWindow, DEFAULT_WINDOW_DAYS};

/// Run the category report over a roster and a transaction log
///
/// Returns `None` without writing anything when no user is active; otherwise
/// writes the sorted report and returns it.
pub async fn generate_report<U, T, W>(
    users: U,
    transactions: T,
    writer: W,
    options: ScanOptions,
    order: SortOrder,
) -> Result<Option<JoinResult>>
where
    U: BufRead,
    T: BufRead,
    W: Write,
{
    report_with(users, || Ok(transactions), writer, options, order).await
}

/// Category report over `users.csv` and `transactions.csv` in the configured directory
///
/// `transactions.csv` is only opened once the roster has an active user.
pub async fn report_from_dir<W: Write>(config: &Config, writer: W) -> Result<Option<JoinResult>> {
    let users = BufReader::new(File::open(config.users_path())?);
    let open_transactions = || -> Result<_> {
        Ok(BufReader::new(File::open(config.transactions_path())?))
    };
    report_with(users, open_transactions, writer, config.scan, config.sort_order).await
}

async fn report_with<U, T, O, W>(
    users: U,
    open_transactions: O,
    writer: W,
    options: ScanOptions,
    order: SortOrder,
) -> Result<Option<JoinResult>>
where
    U: BufRead,
    T: BufRead,
    O: FnOnce() -> Result<T>,
    W: Write,
{
    let active_users = read_active_users(users, options).await?;
    if active_users.is_empty() {
        info!("no active users found");
        return Ok(None);
    }

    let transactions = open_transactions()?;
    let mut result = join_transactions(transactions, Arc::new(active_users), options).await?;
    result.sort(order.is_descending());

    write_report(&result, writer)?;
    info!(categories = result.len(), "report written");
    Ok(Some(result))
}

/// Rolling 7-day table from `transactions.csv`, written to `want.csv`
///
/// Returns the number of data rows written.
pub fn rolling_window_from_dir(config: &Config) -> Result<usize> {
    let window = RollingWindow::from_reader(BufReader::new(File::open(
        config.transactions_path(),
    )?))?;
    let rows = window.rows(DEFAULT_WINDOW_DAYS);

    let output = BufWriter::new(File::create(config.rolling_output_path())?);
    write_rolling_rows(&rows, output)?;
    info!(rows = rows.len(), "rolling window written");
    Ok(rows.len())
}
