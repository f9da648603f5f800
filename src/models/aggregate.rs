use std::collections::HashSet;

use super::user::UserId;

/// Running aggregate of one transaction category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryAggregate {
    pub sum_amount: u32,
    pub contributing_users: HashSet<UserId>,
}

impl CategoryAggregate {
    /// Aggregate seeded with a first contribution
    pub fn seeded(user: UserId, amount: u32) -> Self {
        let mut agg = Self::default();
        agg.add(user, amount);
        agg
    }

    /// Fold one contribution in
    /// Returns false if the sum saturated at `u32::MAX`
    pub fn add(&mut self, user: UserId, amount: u32) -> bool {
        self.contributing_users.insert(user);
        match self.sum_amount.checked_add(amount) {
            Some(sum) => {
                self.sum_amount = sum;
                true
            }
            None => {
                self.sum_amount = u32::MAX;
                false
            }
        }
    }

    /// Number of distinct users, reported as num_users
    pub fn num_users(&self) -> u32 {
        u32::try_from(self.contributing_users.len()).unwrap_or(u32::MAX)
    }
}
