pub mod aggregate;
pub mod join_result;
pub mod transaction;
pub mod user;

pub use aggregate::CategoryAggregate;
pub use join_result::{JoinResult, SumAmount};
pub use transaction::{Contribution, TransactionRecord};
pub use user::{ActiveUserSet, UserId};
