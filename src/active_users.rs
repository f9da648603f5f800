use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ScanOptions;
use crate::error::{FieldError, Result};
use crate::models::ActiveUserSet;
use crate::parse::parse_roster_line;
use crate::scan::fan_out_lines;

/// Build the set of active users from a headered roster stream
///
/// Rows are parsed in parallel according to `options`; active ids are inserted
/// into one shared set. Any row whose user_id is not a valid UUID fails the
/// whole scan, and every row error found before the scan stopped is returned.
pub async fn read_active_users<R: BufRead>(
    reader: R,
    options: ScanOptions,
) -> Result<ActiveUserSet> {
    let users = Arc::new(Mutex::new(ActiveUserSet::new()));

    let shared = users.clone();
    let stats = fan_out_lines(reader, options, move |_row, line| {
        let users = shared.clone();
        async move {
            if let Some(user_id) = parse_roster_line(&line)? {
                users.lock().await.insert(user_id);
            }
            Ok::<(), FieldError>(())
        }
    })
    .await?;

    let active = std::mem::take(&mut *users.lock().await);
    debug!(rows = stats.rows, "roster scan finished");
    info!(active = active.len(), "active users loaded");

    Ok(active)
}
