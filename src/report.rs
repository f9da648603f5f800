use std::io::Write;

use crate::error::Result;
use crate::models::{JoinResult, SumAmount};

pub const REPORT_HEADER: [&str; 3] = ["transaction_category_id", "sum_amount", "num_users"];

/// Write a join result as CSV, in stored order
///
/// The header is always written; every row, the last included, ends with `\n`.
pub fn write_report<S: SumAmount, W: Write>(result: &JoinResult<S>, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(REPORT_HEADER)?;
    for (category_id, sum_amount, num_users) in result.rows() {
        csv_writer.write_record([
            category_id.to_string(),
            sum_amount.to_string(),
            num_users.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
