use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{CategoryAggregate, JoinResult, UserId};

type Shard = HashMap<u8, CategoryAggregate>;

/// Concurrent category → aggregate table
///
/// Categories are spread over N independent shards by `category % num_shards`:
/// - a category always lives in the same shard
/// - contributions to categories in different shards never contend
///
/// # Update atomicity
///
/// [`AggregateTable::add_contribution`] takes the shard's write lock once and
/// holds it for the whole lookup, create-or-update and write-back. Checking
/// for the entry under a read lock and inserting under a separate write lock
/// would let two writers seed the same category and lose one contribution.
///
/// # Example
///
/// ```
/// use category_report::accumulator::AggregateTable;
/// use uuid::Uuid;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let table = AggregateTable::new(4);
///     let user = Uuid::nil();
///
///     table.add_contribution(7, user, 10).await;
///     table.add_contribution(7, user, 5).await;
///
///     let agg = table.get(7).await.unwrap();
///     assert_eq!(agg.sum_amount, 15);
///     assert_eq!(agg.num_users(), 1);
/// }
/// ```
pub struct AggregateTable {
    shards: Vec<Arc<RwLock<Shard>>>,
    num_shards: usize,
}

impl AggregateTable {
    /// Create a table with `num_shards` independently locked shards
    ///
    /// Category ids are `u8`, so more than 256 shards buys nothing.
    pub fn new(num_shards: usize) -> Self {
        assert!(num_shards > 0, "num_shards must be at least 1");

        let shards = (0..num_shards)
            .map(|_| Arc::new(RwLock::new(HashMap::new())))
            .collect();

        Self { shards, num_shards }
    }

    fn shard_for_category(&self, category_id: u8) -> usize {
        (category_id as usize) % self.num_shards
    }

    /// Fold one contribution into its category
    ///
    /// Creates the aggregate seeded with `amount` and `{user}` on first sight,
    /// otherwise adds the amount and inserts the user. Repeated users are
    /// counted once.
    pub async fn add_contribution(&self, category_id: u8, user: UserId, amount: u32) {
        let shard_id = self.shard_for_category(category_id);
        let mut shard = self.shards[shard_id].write().await;

        let saturated = match shard.get_mut(&category_id) {
            Some(agg) => !agg.add(user, amount),
            None => {
                shard.insert(category_id, CategoryAggregate::seeded(user, amount));
                false
            }
        };

        if saturated {
            warn!(category_id, "sum_amount saturated at u32::MAX");
        }
    }

    /// Snapshot of a single category
    pub async fn get(&self, category_id: u8) -> Option<CategoryAggregate> {
        let shard = self.shards[self.shard_for_category(category_id)].read().await;
        shard.get(&category_id).cloned()
    }

    /// Number of distinct categories seen so far
    pub async fn len(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.read().await.len();
        }
        total
    }

    /// Flatten every shard into a [`JoinResult`]
    ///
    /// Entry order follows shard and hash-map iteration and carries no meaning.
    pub async fn to_join_result(&self) -> JoinResult {
        let futures: Vec<_> = self
            .shards
            .iter()
            .map(|shard| async move {
                let shard = shard.read().await;
                shard
                    .iter()
                    .map(|(category_id, agg)| (*category_id, agg.sum_amount, agg.num_users()))
                    .collect::<Vec<_>>()
            })
            .collect();

        let parts = futures::future::join_all(futures).await;
        let mut result = JoinResult::with_capacity(parts.iter().map(Vec::len).sum());
        for (category_id, sum_amount, num_users) in parts.into_iter().flatten() {
            result.push(category_id, sum_amount, num_users);
        }
        result
    }

    /// Clone handle for sharing across tasks
    ///
    /// Cheap (clones the shard `Arc`s); every handle mutates the same table.
    pub fn clone_handle(&self) -> Self {
        Self {
            shards: self.shards.clone(),
            num_shards: self.num_shards,
        }
    }

    pub fn num_shards(&self) -> usize {
        self.num_shards
    }
}
