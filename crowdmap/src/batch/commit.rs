use tracing::{debug, error, trace};

use super::{BitmapBatch, OpTag};
use crate::bitmap;
use crate::storage::{DataStorage, WriteBatch};
use crate::Result;

/// What one commit did to storage
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommitStats {
    pub reads: usize,
    pub writes: usize,
    pub deletes: usize,
    /// Growth of stored values, summed over writes that grew
    pub written_bytes: u64,
    /// Net change in stored bytes; deletes count the key length
    pub changed_bytes: i64,
}

enum Staged {
    Set(usize, Vec<u8>),
    Delete(usize),
}

impl BitmapBatch {
    /// Applies every pending record to storage: one read and one write (or delete) per key.
    ///
    /// Keys are processed in ascending byte order. All values are computed before anything
    /// reaches `wb`, so a failed read or a corrupt stored bitmap leaves `wb` untouched. The
    /// batch is reset either way.
    pub fn commit<S, W>(&mut self, storage: &S, wb: &mut W) -> Result<CommitStats>
    where
        S: DataStorage + ?Sized,
        W: WriteBatch + ?Sized,
    {
        let staged = self.stage(storage);
        let (staged, stats) = match staged {
            Ok(staged) => staged,
            Err(err) => {
                self.reset();
                return Err(err);
            }
        };

        for entry in staged {
            match entry {
                Staged::Set(idx, data) => {
                    let key = &self.pending[idx].key;
                    trace!(key = %String::from_utf8_lossy(key), len = data.len(), "set bitmap");
                    wb.set(key, data);
                }
                Staged::Delete(idx) => {
                    let key = &self.pending[idx].key;
                    trace!(key = %String::from_utf8_lossy(key), "delete bitmap");
                    wb.delete(key);
                }
            }
        }

        debug!(
            keys = self.pending.len(),
            writes = stats.writes,
            deletes = stats.deletes,
            written_bytes = stats.written_bytes,
            changed_bytes = stats.changed_bytes,
            "committed bitmap batch"
        );
        self.reset();
        Ok(stats)
    }

    fn stage<S>(&self, storage: &S) -> Result<(Vec<Staged>, CommitStats)>
    where
        S: DataStorage + ?Sized,
    {
        let mut order: Vec<usize> = (0..self.pending.len()).collect();
        order.sort_by(|&a, &b| self.pending[a].key.cmp(&self.pending[b].key));

        let mut stats = CommitStats::default();
        let mut staged = Vec::with_capacity(order.len());
        for idx in order {
            let pending = &self.pending[idx];
            if pending.ops.last() == Some(&OpTag::Delete) {
                stats.deletes += 1;
                stats.changed_bytes -= pending.key.len() as i64;
                staged.push(Staged::Delete(idx));
                continue;
            }

            let old = storage.get(&pending.key)?.unwrap_or_default();
            stats.reads += 1;

            let mut working = bitmap::decode_at(&pending.key, &old).map_err(|err| {
                error!(error = %err, "stored bitmap is corrupt, aborting commit");
                err
            })?;
            pending.replay(&mut working);
            if self.config.run_optimize {
                working.run_optimize();
            }

            let data = bitmap::encode(&working);
            let delta = data.len() as i64 - old.len() as i64;
            stats.writes += 1;
            stats.written_bytes += delta.max(0) as u64;
            stats.changed_bytes += delta;
            staged.push(Staged::Set(idx, data));
        }

        Ok((staged, stats))
    }
}
