use std::collections::HashSet;

use uuid::Uuid;

/// 128-bit user identifier, parsed from its 36-character textual form
pub type UserId = Uuid;

/// Identifiers of every user flagged active in the roster
///
/// Built once by the roster scan and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveUserSet {
    users: HashSet<UserId>,
}

impl ActiveUserSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the user was already present
    pub fn insert(&mut self, user: UserId) -> bool {
        self.users.insert(user)
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.users.contains(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<UserId> for ActiveUserSet {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self {
            users: iter.into_iter().collect(),
        }
    }
}
