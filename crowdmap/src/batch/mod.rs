//! Per-apply-batch coalescing of bitmap mutations.
//!
//! Every mutation recorded against a key between two commits folds into one pending record:
//! the ordered list of operation tags plus one accumulator bitmap for all added members and
//! one for all removed members. [`BitmapBatch::commit`] then reads each key once, replays the
//! tags over the stored bitmap and writes it back once.
//!
//! # Example
//!
//! ```rust
//! use crowdmap::storage::{MemStorage, MemWriteBatch};
//! use crowdmap::{bitmap, BitmapBatch, Op};
//!
//! let mut storage = MemStorage::new();
//! let mut batch = BitmapBatch::new();
//!
//! batch.record(b"crowd", Op::add(&[1, 2, 3])).unwrap();
//! batch.record(b"crowd", Op::add(&[3, 4])).unwrap();
//! batch.record(b"crowd", Op::Remove(&[2])).unwrap();
//!
//! let mut wb = MemWriteBatch::new();
//! let stats = batch.commit(&storage, &mut wb).unwrap();
//! assert_eq!((stats.reads, stats.writes), (1, 1));
//! storage.apply(wb);
//!
//! let stored = bitmap::decode(storage.peek(b"crowd").unwrap()).unwrap();
//! assert_eq!(stored.to_vec(), [1, 3, 4]);
//! ```

use croaring::Bitmap;
use tracing::{error, trace};

use crate::bitmap::{ops, Pool, Recycle};
use crate::command::{Command, CommandKind, Payload};
use crate::{Config, Error, Result};

mod commit;

pub use self::commit::CommitStats;

/// A mutation against one bitmap key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op<'a> {
    /// With `stride == 0`, adds `values`. Otherwise `values` is `[start, end]` and every
    /// multiple of `stride` in that closed range is added.
    Add { values: &'a [u32], stride: u32 },
    Remove(&'a [u32]),
    Clear,
    Delete,
}

impl<'a> Op<'a> {
    pub fn add(values: &'a [u32]) -> Self {
        Op::Add { values, stride: 0 }
    }

    pub fn tag(&self) -> OpTag {
        match self {
            Op::Add { .. } => OpTag::Add,
            Op::Remove(_) => OpTag::Remove,
            Op::Clear => OpTag::Clear,
            Op::Delete => OpTag::Delete,
        }
    }
}

/// The operation kinds replayed at commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    Add,
    Remove,
    Clear,
    Delete,
}

#[derive(Debug)]
struct Pending {
    key: Vec<u8>,
    ops: Vec<OpTag>,
    adds: Option<Bitmap>,
    removes: Option<Bitmap>,
}

impl Pending {
    fn replay(&self, working: &mut Bitmap) {
        for op in &self.ops {
            match op {
                OpTag::Add => {
                    if let Some(adds) = &self.adds {
                        working.or_inplace(adds);
                    }
                }
                OpTag::Remove => {
                    if let Some(removes) = &self.removes {
                        ops::in_place_remove(working, removes);
                    }
                }
                OpTag::Clear | OpTag::Delete => working.clear(),
            }
        }
    }
}

/// Coalesces the bitmap mutations of one apply batch.
///
/// A batch belongs to the apply loop of a single replica. It is reset after every commit
/// and can be reused for the next batch.
#[derive(Debug)]
pub struct BitmapBatch {
    pending: Vec<Pending>,
    pool: Pool<Bitmap>,
    config: Config,
}

impl BitmapBatch {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        BitmapBatch {
            pending: Vec::new(),
            pool: Pool::with_capacity(config.pool_capacity),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns true if the command kind is a mutation this batch coalesces
    pub fn supports(kind: CommandKind) -> bool {
        kind.is_mutation()
    }

    /// Number of distinct keys touched since the last commit
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Keys touched since the last commit, in first-touch order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.pending.iter().map(|pending| pending.key.as_slice())
    }

    /// The operation tags recorded against `key`, in arrival order
    pub fn ops(&self, key: &[u8]) -> Option<&[OpTag]> {
        self.pending
            .iter()
            .find(|pending| pending.key == key)
            .map(|pending| pending.ops.as_slice())
    }

    /// Folds `op` into the pending record for `key`.
    ///
    /// A malformed strided add is rejected without recording anything.
    pub fn record(&mut self, key: &[u8], op: Op<'_>) -> Result<()> {
        if let Op::Add { values, stride } = op {
            if stride > 0 {
                check_stride(values)?;
            }
        }

        let idx = match self.pending.iter().position(|pending| pending.key == key) {
            Some(idx) => idx,
            None => {
                trace!(key = %String::from_utf8_lossy(key), "new pending bitmap");
                self.pending.push(Pending {
                    key: key.to_vec(),
                    ops: Vec::new(),
                    adds: None,
                    removes: None,
                });
                self.pending.len() - 1
            }
        };

        let pool = &mut self.pool;
        let pending = &mut self.pending[idx];
        pending.ops.push(op.tag());

        match op {
            Op::Add { values, stride } => {
                let adds = pending.adds.get_or_insert_with(|| pool.acquire());
                add_values(adds, values, stride);
            }
            Op::Remove(values) => {
                let removes = pending.removes.get_or_insert_with(|| pool.acquire());
                removes.add_many(values);
            }
            Op::Clear | Op::Delete => {
                if let Some(adds) = pending.adds.take() {
                    pool.release(adds);
                }
                if let Some(removes) = pending.removes.take() {
                    pool.release(removes);
                }
            }
        }

        Ok(())
    }

    /// Records a decoded mutation command.
    ///
    /// `Create` adds like `Add`. A payload that does not fit the command kind is
    /// [`Error::MalformedPayload`] and records nothing.
    ///
    /// # Panics
    ///
    /// Read-only commands never reach the apply batch; receiving one means this replica and
    /// the dispatch layer disagree on the protocol, and the apply loop must stop.
    pub fn add_request(&mut self, command: &Command) -> Result<()> {
        let key = command.key.as_slice();
        match (command.kind, &command.payload) {
            (kind @ (CommandKind::Range | CommandKind::Count | CommandKind::Contains), _) => {
                error!(?kind, "BUG: read-only command reached the apply batch");
                panic!("BUG: not supported bitmap batch command: {:?}", kind);
            }
            (CommandKind::Create | CommandKind::Add, &Payload::Stride { start, end, stride }) => {
                self.record(
                    key,
                    Op::Add {
                        values: &[start, end],
                        stride,
                    },
                )
            }
            (CommandKind::Create | CommandKind::Add, Payload::Members(values)) => {
                self.record(key, Op::add(values))
            }
            (CommandKind::Remove, Payload::Members(values)) => {
                self.record(key, Op::Remove(values))
            }
            (CommandKind::Clear, Payload::None) => self.record(key, Op::Clear),
            (CommandKind::Delete, Payload::None) => self.record(key, Op::Delete),
            _ => Err(command.malformed()),
        }
    }

    /// Drops every pending record, keeping accumulator bitmaps for reuse
    pub fn reset(&mut self) {
        for pending in self.pending.drain(..) {
            if let Some(adds) = pending.adds {
                self.pool.release(adds);
            }
            if let Some(removes) = pending.removes {
                self.pool.release(removes);
            }
        }
    }
}

impl Default for BitmapBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Recycle for BitmapBatch {
    fn fresh() -> Self {
        BitmapBatch::new()
    }

    fn recycle(&mut self) {
        self.reset();
    }
}

fn check_stride(values: &[u32]) -> Result<()> {
    match *values {
        [start, end] if start > end => Err(Error::InvalidRange { start, end }),
        [_, _] => Ok(()),
        _ => Err(Error::MalformedStride { len: values.len() }),
    }
}

fn add_values(bitmap: &mut Bitmap, values: &[u32], stride: u32) {
    if stride == 0 {
        bitmap.add_many(values);
        return;
    }

    let (start, end) = (values[0], values[1]);
    let first = u64::from(start).div_ceil(u64::from(stride)) * u64::from(stride);
    match u32::try_from(first) {
        Ok(first) if first <= end => {
            bitmap.or_inplace(&Bitmap::from_range_with_step(first..=end, stride));
        }
        _ => {}
    }
}
