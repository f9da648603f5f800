//! Field extraction from raw delimited lines.
//!
//! Lines are split on the delimiter instead of relying on column widths, so a
//! short or malformed row is reported instead of being read at the wrong offset.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::FieldError;

pub const DELIMITER: char = ',';
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Truthy flag values: `true`, `t` or `1`, case-insensitive
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("t") || value == "1"
}

pub fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, FieldError> {
    Uuid::parse_str(value.trim()).map_err(|source| FieldError::InvalidUuid { field, source })
}

pub fn parse_date(value: &str) -> Result<NaiveDate, FieldError> {
    Ok(NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)?)
}

fn parse_u32(field: &'static str, value: &str) -> Result<u32, FieldError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|source| FieldError::InvalidNumber { field, source })
}

fn parse_u8(field: &'static str, value: &str) -> Result<u8, FieldError> {
    value
        .trim()
        .parse::<u8>()
        .map_err(|source| FieldError::InvalidNumber { field, source })
}

/// Raw fields of a roster line: `user_id,is_active[,...]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterFields<'a> {
    pub user_id: &'a str,
    pub is_active: &'a str,
}

impl<'a> RosterFields<'a> {
    pub fn split(line: &'a str) -> Result<Self, FieldError> {
        let mut fields = line.splitn(3, DELIMITER);
        let user_id = fields.next().ok_or(FieldError::Missing("user_id"))?;
        let is_active = fields.next().ok_or(FieldError::Missing("is_active"))?;
        Ok(Self { user_id, is_active })
    }
}

/// Parse a roster line, returning the user id if the user is active
///
/// The identifier is validated on every row, the flag never fails.
pub fn parse_roster_line(line: &str) -> Result<Option<Uuid>, FieldError> {
    let fields = RosterFields::split(line)?;
    let user_id = parse_uuid("user_id", fields.user_id)?;
    Ok(is_truthy(fields.is_active).then_some(user_id))
}

/// Raw fields of a transaction log line
///
/// `transaction_id,date,user_id,is_blocked,...,transaction_amount,transaction_category_id`
///
/// The two numeric fields are taken from the right, the four leading ones from
/// the left; anything in between is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionFields<'a> {
    pub transaction_id: &'a str,
    pub date: &'a str,
    pub user_id: &'a str,
    pub is_blocked: &'a str,
    pub transaction_amount: &'a str,
    pub transaction_category_id: &'a str,
}

impl<'a> TransactionFields<'a> {
    pub fn split(line: &'a str) -> Result<Self, FieldError> {
        let mut tail = line.rsplitn(3, DELIMITER);
        let transaction_category_id = tail
            .next()
            .ok_or(FieldError::Missing("transaction_category_id"))?;
        let transaction_amount = tail.next().ok_or(FieldError::Missing("transaction_amount"))?;
        let head = tail.next().ok_or(FieldError::Missing("transaction_id"))?;

        let mut lead = head.splitn(5, DELIMITER);
        let transaction_id = lead.next().ok_or(FieldError::Missing("transaction_id"))?;
        let date = lead.next().ok_or(FieldError::Missing("date"))?;
        let user_id = lead.next().ok_or(FieldError::Missing("user_id"))?;
        let is_blocked = lead.next().ok_or(FieldError::Missing("is_blocked"))?;

        Ok(Self {
            transaction_id,
            date,
            user_id,
            is_blocked,
            transaction_amount,
            transaction_category_id,
        })
    }

    pub fn is_blocked(&self) -> bool {
        is_truthy(self.is_blocked)
    }

    pub fn user_id(&self) -> Result<Uuid, FieldError> {
        parse_uuid("user_id", self.user_id)
    }

    pub fn amount(&self) -> Result<u32, FieldError> {
        parse_u32("transaction_amount", self.transaction_amount)
    }

    pub fn category_id(&self) -> Result<u8, FieldError> {
        parse_u8("transaction_category_id", self.transaction_category_id)
    }

    /// Structural checks on the fields the join itself does not consume
    pub fn validate_remaining(&self) -> Result<(), FieldError> {
        parse_uuid("transaction_id", self.transaction_id)?;
        parse_date(self.date)?;
        Ok(())
    }
}
