use std::fmt;

use thiserror::Error;

use crate::command::CommandKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the apply layer
#[derive(Error, Debug)]
pub enum Error {
    /// Persisted bytes did not parse back into a bitmap
    #[error("corrupt bitmap{}: {len} bytes failed to decode", DisplayKey(.key))]
    Decode { key: Option<Vec<u8>>, len: usize },

    /// The storage collaborator failed a read
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A dynamic algebra operand was not a bitmap
    #[error("operand {position} is a {found}, expected a bitmap")]
    TypeMismatch { position: usize, found: &'static str },

    #[error("invalid strided range: start {start} > end {end}")]
    InvalidRange { start: u32, end: u32 },

    #[error("strided add expects [start, end], got {len} values")]
    MalformedStride { len: usize },

    #[error("cannot rebalance over zero shards")]
    NoShards,

    #[error("unknown command kind {0}")]
    UnknownCommand(u32),

    #[error("{0:?} is not a query command")]
    NotAQuery(CommandKind),

    /// The payload shape does not belong to the command kind
    #[error("{kind:?} command does not take a {payload} payload")]
    MalformedPayload {
        kind: CommandKind,
        payload: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps any collaborator error as [`Error::Storage`]
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Storage(err.into())
    }
}

struct DisplayKey<'a>(&'a Option<Vec<u8>>);

impl fmt::Display for DisplayKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(key) => write!(f, " at key {}", String::from_utf8_lossy(key)),
            None => Ok(()),
        }
    }
}
