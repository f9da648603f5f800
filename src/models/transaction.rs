use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::user::UserId;

/// A transaction that passed the blocked filter and the active-user join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub category_id: u8,
    pub user_id: UserId,
    pub amount: u32,
}

/// Full transaction record from the transaction log
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    pub transaction_id: Uuid,
    pub date: NaiveDate,
    pub user_id: UserId,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_blocked: bool,
    pub transaction_amount: u32,
    pub transaction_category_id: u8,
}

/// Lenient boolean: anything that is not a truthy token is false
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(crate::parse::is_truthy(&s))
}
