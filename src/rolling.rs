use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{BufRead, Write};

use chrono::{Days, NaiveDate};
use csv::StringRecord;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{FieldError, Result, RowError};
use crate::models::{TransactionRecord, UserId};
use crate::parse::DELIMITER;
use crate::scan::numbered_lines;

pub const DEFAULT_WINDOW_DAYS: u64 = 7;

const OUTPUT_HEADER: [&str; 4] = ["transaction_id", "user_id", "date", "total_lookup_7days"];

/// Distinct transactions of one user on one day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDailyRecord {
    transaction_ids: HashSet<Uuid>,
}

impl UserDailyRecord {
    pub fn add(&mut self, transaction_id: Uuid) -> bool {
        self.transaction_ids.insert(transaction_id)
    }

    pub fn count(&self) -> usize {
        self.transaction_ids.len()
    }
}

/// Per-user calendar of daily distinct transaction counts
#[derive(Debug, Clone, Default)]
pub struct UserCalendar {
    users: HashMap<UserId, BTreeMap<NaiveDate, UserDailyRecord>>,
}

impl UserCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction; a repeated id on the same day is counted once
    pub fn add(&mut self, user_id: UserId, transaction_id: Uuid, date: NaiveDate) {
        self.users
            .entry(user_id)
            .or_default()
            .entry(date)
            .or_default()
            .add(transaction_id);
    }

    pub fn daily_count(&self, user_id: &UserId, date: NaiveDate) -> usize {
        self.users
            .get(user_id)
            .and_then(|days| days.get(&date))
            .map_or(0, UserDailyRecord::count)
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    /// Sum of daily counts over dates strictly before `date` and no more than
    /// `window_days * 24` hours before it
    pub fn count_cumulative_prev_days(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        window_days: u64,
    ) -> usize {
        let Some(days) = self.users.get(user_id) else {
            return 0;
        };
        let from = date
            .checked_sub_days(Days::new(window_days))
            .unwrap_or(NaiveDate::MIN);
        days.range(from..date).map(|(_, record)| record.count()).sum()
    }

    /// Backward window totals for every (user, date) pair in the calendar
    pub fn cumulative_totals(&self, window_days: u64) -> HashMap<(UserId, NaiveDate), usize> {
        self.users
            .iter()
            .flat_map(|(user_id, days)| {
                days.keys().map(move |date| {
                    (
                        (*user_id, *date),
                        self.count_cumulative_prev_days(user_id, *date, window_days),
                    )
                })
            })
            .collect()
    }
}

/// One output row of the rolling-window table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollingRow {
    pub transaction_id: Uuid,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub total_lookup_7days: usize,
}

/// Transactions deduplicated by (transaction_id, user_id), plus their calendar
#[derive(Debug, Default)]
pub struct RollingWindow {
    transactions: Vec<TransactionRecord>,
    seen: HashSet<(Uuid, UserId)>,
    calendar: UserCalendar,
}

impl RollingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a headered transaction log
    ///
    /// Every record feeds the calendar, blocked or not. Rows are numbered like
    /// the report scan: header is row 0 and blank lines still count. A record
    /// failing to deserialize aborts the read with its row index.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut window = Self::new();
        let mut headers = StringRecord::new();

        for line in numbered_lines(reader) {
            let (row, line) = line?;
            let fields = split_fields(&line);
            if row == 0 {
                headers = fields;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let tag = |kind| RowError { row, kind };
            if fields.len() != headers.len() {
                return Err(tag(FieldError::FieldCount {
                    expected: headers.len(),
                    found: fields.len(),
                })
                .into());
            }
            let record = fields
                .deserialize::<TransactionRecord>(Some(&headers))
                .map_err(|e| tag(FieldError::Record(e)))?;
            window.add(record);
        }

        info!(
            transactions = window.transactions.len(),
            users = window.calendar.num_users(),
            "rolling window input loaded"
        );
        Ok(window)
    }

    pub fn add(&mut self, record: TransactionRecord) {
        self.calendar
            .add(record.user_id, record.transaction_id, record.date);
        if self.seen.insert((record.transaction_id, record.user_id)) {
            self.transactions.push(record);
        }
    }

    /// Output rows in first-appearance order
    pub fn rows(&self, window_days: u64) -> Vec<RollingRow> {
        let totals = self.calendar.cumulative_totals(window_days);
        self.transactions
            .iter()
            .map(|t| RollingRow {
                transaction_id: t.transaction_id,
                user_id: t.user_id,
                date: t.date,
                total_lookup_7days: totals.get(&(t.user_id, t.date)).copied().unwrap_or(0),
            })
            .collect()
    }
}

fn split_fields(line: &str) -> StringRecord {
    line.split(DELIMITER).map(str::trim).collect()
}

/// Write the rolling-window table, header included
pub fn write_rolling_rows<W: Write>(rows: &[RollingRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(OUTPUT_HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}
