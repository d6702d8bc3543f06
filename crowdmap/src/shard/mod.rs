//! Partitioning a crowd bitmap across a fixed number of shards.

mod alloc;
mod split;

pub use self::alloc::{is_partition, rebalance, Churn};
pub use self::split::split;
