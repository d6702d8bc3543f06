//! Apply layer for roaring-bitmap crowds in a replicated key-value store.
//!
//! * [`BitmapBatch`] coalesces the bitmap mutations of one log-apply batch so that each key
//!   is read once and written once.
//! * [`bitmap::ops`] is the set algebra the rest is built on.
//! * [`shard::rebalance`] keeps a crowd partitioned across shards with minimal churn, and
//!   [`shard::split`] cuts a crowd into bounded chunks.
//!
//! Members are `u32`s held in [`croaring::Bitmap`]s and persisted in the portable roaring
//! format.
//!
//! # Example
//!
//! ```rust
//! use croaring::Bitmap;
//! use crowdmap::storage::{MemStorage, MemWriteBatch};
//! use crowdmap::{query, shard, BitmapBatch, Command};
//!
//! let mut storage = MemStorage::new();
//! let mut batch = BitmapBatch::new();
//!
//! batch.add_request(&Command::add_stride("crowd", 0, 100, 10)).unwrap();
//! batch.add_request(&Command::remove("crowd", &[50])).unwrap();
//!
//! let mut wb = MemWriteBatch::new();
//! batch.commit(&storage, &mut wb).unwrap();
//! storage.apply(wb);
//!
//! assert_eq!(query::count(&storage, b"crowd").unwrap(), 10);
//!
//! let desired: Bitmap = (0..1000).collect();
//! let mut shards = vec![Bitmap::new(); 4];
//! shard::rebalance(&desired, &mut shards).unwrap();
//! assert!(shard::is_partition(&desired, &shards));
//! ```

pub mod batch;
pub mod bitmap;
pub mod command;
mod config;
mod error;
pub mod query;
pub mod shard;
pub mod storage;

pub use crate::batch::{BitmapBatch, CommitStats, Op, OpTag};
pub use crate::command::{Command, CommandKind, Payload};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
