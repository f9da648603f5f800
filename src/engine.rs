use std::io::BufRead;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::accumulator::AggregateTable;
use crate::config::ScanOptions;
use crate::error::{FieldError, Result};
use crate::models::{ActiveUserSet, Contribution, JoinResult};
use crate::parse::TransactionFields;
use crate::scan::fan_out_lines;

/// Apply the blocked filter, the active-user join and validation to one line
///
/// Returns `Ok(None)` for rows that are blocked or belong to an inactive user.
/// Those rows are not validated past the user id.
pub fn classify_transaction_line(
    line: &str,
    active_users: &ActiveUserSet,
) -> std::result::Result<Option<Contribution>, FieldError> {
    let fields = TransactionFields::split(line)?;

    if fields.is_blocked() {
        return Ok(None);
    }

    let user_id = fields.user_id()?;
    // join condition
    if !active_users.contains(&user_id) {
        return Ok(None);
    }

    let category_id = fields.category_id()?;
    let amount = fields.amount()?;
    fields.validate_remaining()?;

    Ok(Some(Contribution {
        category_id,
        user_id,
        amount,
    }))
}

/// Join the transaction log with the active users, grouped by category
///
/// Equivalent to:
///
/// ```sql
/// SELECT t.transaction_category_id,
///        SUM(t.transaction_amount)   AS sum_amount,
///        COUNT(DISTINCT t.user_id)   AS num_users
/// FROM transactions t JOIN users u USING (user_id)
/// WHERE NOT t.is_blocked AND u.is_active
/// GROUP BY t.transaction_category_id
/// ```
///
/// The returned [`JoinResult`] is unsorted.
pub struct JoinEngine {
    active_users: Arc<ActiveUserSet>,
    table: AggregateTable,
    options: ScanOptions,
}

impl JoinEngine {
    pub fn new(active_users: Arc<ActiveUserSet>, options: ScanOptions) -> Self {
        Self {
            active_users,
            table: AggregateTable::new(options.workers.clamp(1, 256)),
            options,
        }
    }

    /// Stream the transaction log into the aggregate table
    pub async fn ingest<R: BufRead>(&self, reader: R) -> Result<()> {
        let active_users = self.active_users.clone();
        let table = self.table.clone_handle();
        let joined = Arc::new(AtomicUsize::new(0));

        let counter = joined.clone();
        let stats = fan_out_lines(reader, self.options, move |_row, line| {
            let active_users = active_users.clone();
            let table = table.clone_handle();
            let counter = counter.clone();
            async move {
                if let Some(c) = classify_transaction_line(&line, &active_users)? {
                    table.add_contribution(c.category_id, c.user_id, c.amount).await;
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                Ok::<(), FieldError>(())
            }
        })
        .await?;

        let joined = joined.load(Ordering::Relaxed);
        info!(
            rows = stats.rows,
            joined,
            skipped = stats.rows - joined,
            "transaction scan finished"
        );
        Ok(())
    }

    pub fn table(&self) -> &AggregateTable {
        &self.table
    }

    pub async fn into_join_result(self) -> JoinResult {
        self.table.to_join_result().await
    }
}

/// Convenience wrapper: ingest a whole stream and flatten the table
pub async fn join_transactions<R: BufRead>(
    reader: R,
    active_users: Arc<ActiveUserSet>,
    options: ScanOptions,
) -> Result<JoinResult> {
    let engine = JoinEngine::new(active_users, options);
    engine.ingest(reader).await?;
    Ok(engine.into_join_result().await)
}
