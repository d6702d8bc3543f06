//! Read-only bitmap commands.
//!
//! Reads see committed state only; they never go through a [`BitmapBatch`][crate::BitmapBatch].

use croaring::Bitmap;

use crate::bitmap;
use crate::command::{Command, CommandKind, Payload};
use crate::storage::DataStorage;
use crate::{Error, Result};

/// Result of a read-only command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Count(u64),
    Contains(bool),
    Range(Vec<u32>),
}

fn load<S: DataStorage + ?Sized>(storage: &S, key: &[u8]) -> Result<Bitmap> {
    match storage.get(key)? {
        Some(data) => bitmap::decode_at(key, &data),
        None => Ok(Bitmap::new()),
    }
}

/// Number of members stored at `key`
pub fn count<S: DataStorage + ?Sized>(storage: &S, key: &[u8]) -> Result<u64> {
    Ok(load(storage, key)?.cardinality())
}

/// Returns true if every one of `members` is stored at `key`
pub fn contains<S: DataStorage + ?Sized>(
    storage: &S,
    key: &[u8],
    members: &[u32],
) -> Result<bool> {
    let bitmap = load(storage, key)?;
    Ok(members.iter().all(|&member| bitmap.contains(member)))
}

/// Up to `limit` members stored at `key` that are `>= start`, ascending
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::{bitmap, query};
/// use crowdmap::storage::MemStorage;
///
/// let mut storage = MemStorage::new();
/// storage.insert("k", bitmap::encode(&Bitmap::of(&[1, 5, 9, 13])));
///
/// assert_eq!(query::range(&storage, b"k", 5, 2).unwrap(), [5, 9]);
/// assert_eq!(query::range(&storage, b"k", 10, 100).unwrap(), [13]);
/// ```
pub fn range<S: DataStorage + ?Sized>(
    storage: &S,
    key: &[u8],
    start: u32,
    limit: u64,
) -> Result<Vec<u32>> {
    let bitmap = load(storage, key)?;
    let mut iter = bitmap.iter();
    iter.reset_at_or_after(start);
    Ok(iter.take(usize::try_from(limit).unwrap_or(usize::MAX)).collect())
}

/// Evaluates a read-only command
pub fn query<S: DataStorage + ?Sized>(storage: &S, command: &Command) -> Result<QueryResult> {
    let key = command.key.as_slice();
    match (command.kind, &command.payload) {
        (kind, _) if kind.is_mutation() => Err(Error::NotAQuery(kind)),
        (CommandKind::Count, Payload::None) => count(storage, key).map(QueryResult::Count),
        (CommandKind::Contains, Payload::Members(members)) => {
            contains(storage, key, members).map(QueryResult::Contains)
        }
        (CommandKind::Range, &Payload::Window { start, limit }) => {
            range(storage, key, start, limit).map(QueryResult::Range)
        }
        _ => Err(command.malformed()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::MemStorage;

    fn storage() -> MemStorage {
        let mut storage = MemStorage::new();
        storage.insert("k", bitmap::encode(&Bitmap::of(&[2, 4, 6, 8])));
        storage.insert("bad", vec![9, 9, 9]);
        storage
    }

    #[test]
    fn absent_key_is_empty() {
        let storage = storage();
        assert_eq!(count(&storage, b"nope").unwrap(), 0);
        assert!(!contains(&storage, b"nope", &[1]).unwrap());
        assert!(range(&storage, b"nope", 0, 10).unwrap().is_empty());
    }

    #[test]
    fn contains_needs_all() {
        let storage = storage();
        assert!(contains(&storage, b"k", &[2, 8]).unwrap());
        assert!(!contains(&storage, b"k", &[2, 3]).unwrap());
        assert!(contains(&storage, b"k", &[]).unwrap());
    }

    #[test]
    fn range_window() {
        let storage = storage();
        assert_eq!(range(&storage, b"k", 3, 2).unwrap(), [4, 6]);
        assert!(range(&storage, b"k", 9, 2).unwrap().is_empty());
        assert!(range(&storage, b"k", 0, 0).unwrap().is_empty());
    }

    #[test]
    fn dispatch() {
        let storage = storage();
        assert_eq!(
            query(&storage, &Command::count("k")).unwrap(),
            QueryResult::Count(4)
        );
        assert_eq!(
            query(&storage, &Command::contains("k", &[4])).unwrap(),
            QueryResult::Contains(true)
        );
        assert_eq!(
            query(&storage, &Command::range("k", 5, 10)).unwrap(),
            QueryResult::Range(vec![6, 8])
        );
        assert!(matches!(
            query(&storage, &Command::add("k", &[1])),
            Err(Error::NotAQuery(CommandKind::Add))
        ));
    }

    #[test]
    fn mismatched_payload() {
        let storage = storage();
        let commands = [
            Command::new("k", CommandKind::Contains, Payload::None),
            Command::new("k", CommandKind::Range, Payload::Members(vec![1])),
            Command::new("k", CommandKind::Count, Payload::Window { start: 0, limit: 1 }),
        ];

        for command in &commands {
            assert!(matches!(
                query(&storage, command),
                Err(Error::MalformedPayload { kind, .. }) if kind == command.kind
            ));
        }
        assert_eq!(storage.reads(), 0);
    }

    #[test]
    fn corrupt_value() {
        let storage = storage();
        assert!(matches!(count(&storage, b"bad"), Err(Error::Decode { .. })));
    }
}
