//! The storage collaborator, as seen from the apply layer.
//!
//! The replicated key-value engine itself lives elsewhere; the apply layer only needs a
//! point read and a write batch that is applied as a unit.

use std::cell::Cell;
use std::collections::BTreeMap;

use crate::Result;

/// Point reads against the current replica state
pub trait DataStorage {
    /// Returns the stored value, or `None` if the key is absent.
    ///
    /// Implementations wrap their own failures with [`Error::storage`][crate::Error::storage].
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// Mutations accumulated for one apply step, applied by the collaborator as a unit
pub trait WriteBatch {
    fn set(&mut self, key: &[u8], value: Vec<u8>);
    fn delete(&mut self, key: &[u8]);
}

/// A single write batch entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Set(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

impl Mutation {
    pub fn key(&self) -> &[u8] {
        match self {
            Mutation::Set(key, _) | Mutation::Delete(key) => key,
        }
    }
}

/// A write batch that records mutations in order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemWriteBatch {
    pub mutations: Vec<Mutation>,
}

impl MemWriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

impl WriteBatch for MemWriteBatch {
    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.mutations.push(Mutation::Set(key.to_vec(), value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.mutations.push(Mutation::Delete(key.to_vec()));
    }
}

/// An in-memory store that counts the reads it serves
///
/// # Examples
///
/// ```
/// use crowdmap::storage::{DataStorage, MemStorage, MemWriteBatch, WriteBatch};
///
/// let mut storage = MemStorage::new();
/// let mut wb = MemWriteBatch::new();
/// wb.set(b"k", vec![1, 2, 3]);
/// storage.apply(wb);
///
/// assert_eq!(storage.get(b"k").unwrap(), Some(vec![1, 2, 3]));
/// assert_eq!(storage.reads(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemStorage {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    reads: Cell<usize>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every mutation in `batch`, in order
    pub fn apply(&mut self, batch: MemWriteBatch) {
        for mutation in batch.mutations {
            match mutation {
                Mutation::Set(key, value) => {
                    self.data.insert(key, value);
                }
                Mutation::Delete(key) => {
                    self.data.remove(&key);
                }
            }
        }
    }

    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        self.data.insert(key.into(), value);
    }

    /// Reads the raw value without counting it
    pub fn peek(&self, key: &[u8]) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.data.contains_key(key)
    }

    /// Number of reads served so far
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn reset_reads(&self) {
        self.reads.set(0);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl DataStorage for MemStorage {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.data.get(key).cloned())
    }
}
