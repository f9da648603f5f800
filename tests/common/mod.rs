#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use category_report::config::{ScanOptions, SortOrder};
use category_report::models::JoinResult;
use uuid::Uuid;

pub const USERS_HEADER: &str = "user_id,is_active";
pub const TRANSACTIONS_HEADER: &str =
    "transaction_id,date,user_id,is_blocked,transaction_amount,transaction_category_id";

pub const ALICE: &str = "ede06128-d6c3-4203-a28e-06adadc6d2db";
pub const BOB: &str = "d07f1e39-4b31-406a-a5b8-b7ae6be878d9";
pub const CAROL: &str = "c27ce481-69d7-4f54-9ffb-73c8f582d5a0";

/// Deterministic UUID for generated data
pub fn uuid_for(n: u128) -> Uuid {
    Uuid::from_u128(0x1000_0000_0000_4000_8000_0000_0000_0000 + n)
}

/// Build a roster from `(user_id, is_active)` pairs
pub fn build_users_csv(rows: &[(&str, &str)]) -> String {
    let mut csv = format!("{}\n", USERS_HEADER);
    for (user_id, is_active) in rows {
        csv.push_str(&format!("{},{}\n", user_id, is_active));
    }
    csv
}

/// One transaction log row
pub struct TxRow<'a> {
    pub transaction_id: String,
    pub date: &'a str,
    pub user_id: &'a str,
    pub is_blocked: &'a str,
    pub amount: u32,
    pub category: u8,
}

pub fn tx<'a>(
    n: u128,
    user_id: &'a str,
    is_blocked: &'a str,
    amount: u32,
    category: u8,
) -> TxRow<'a> {
    TxRow {
        transaction_id: uuid_for(n).to_string(),
        date: "2022-10-18",
        user_id,
        is_blocked,
        amount,
        category,
    }
}

pub fn build_transactions_csv(rows: &[TxRow<'_>]) -> String {
    let mut csv = format!("{}\n", TRANSACTIONS_HEADER);
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            row.transaction_id, row.date, row.user_id, row.is_blocked, row.amount, row.category
        ));
    }
    csv
}

/// Run the whole report on in-memory CSV and return the rendered output
pub async fn run_report(
    users: &str,
    transactions: &str,
    options: ScanOptions,
    order: SortOrder,
) -> Result<(Option<JoinResult>, String), Box<dyn std::error::Error>> {
    let mut output = Vec::new();
    let result = category_report::generate_report(
        users.as_bytes(),
        transactions.as_bytes(),
        &mut output,
        options,
        order,
    )
    .await?;
    Ok((result, String::from_utf8(output)?))
}

/// Category → (sum_amount, num_users), independent of row order
pub fn by_category(result: &JoinResult) -> BTreeMap<u8, (u32, u32)> {
    result.rows().map(|(c, s, n)| (c, (s, n))).collect()
}

pub fn categories(pairs: &[(u8, (u32, u32))]) -> BTreeMap<u8, (u32, u32)> {
    pairs.iter().copied().collect()
}

/// Consecutive runs of equal sums, each run reduced to its category set
pub fn tied_groups(result: &JoinResult) -> Vec<(u32, BTreeSet<u8>)> {
    let mut groups: Vec<(u32, BTreeSet<u8>)> = Vec::new();
    for (category, sum, _) in result.rows() {
        match groups.last_mut() {
            Some((last_sum, set)) if *last_sum == sum => {
                set.insert(category);
            }
            _ => groups.push((sum, BTreeSet::from([category]))),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_users_csv() {
        let csv = build_users_csv(&[(ALICE, "True"), (BOB, "False")]);
        assert!(csv.starts_with("user_id,is_active\n"));
        assert!(csv.contains(&format!("{},True\n", ALICE)));
        assert!(csv.ends_with(&format!("{},False\n", BOB)));
    }

    #[test]
    fn test_build_transactions_csv() {
        let csv = build_transactions_csv(&[tx(1, ALICE, "False", 10, 3)]);
        assert!(csv.starts_with(TRANSACTIONS_HEADER));
        assert!(csv.contains(&format!("2022-10-18,{},False,10,3\n", ALICE)));
    }

    #[test]
    fn test_uuid_for_is_distinct() {
        assert_ne!(uuid_for(1), uuid_for(2));
        assert_eq!(uuid_for(7).to_string().len(), 36);
    }
}
