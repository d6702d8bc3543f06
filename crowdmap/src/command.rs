//! Decoded bitmap commands, as handed over by the dispatch layer.

use std::convert::TryFrom;

use crate::Error;

/// The kind of a bitmap command
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandKind {
    Create = 0,
    Add = 1,
    Remove = 2,
    Clear = 3,
    Delete = 4,
    Range = 5,
    Count = 6,
    Contains = 7,
}

impl CommandKind {
    /// Returns true if the command changes the stored bitmap
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            CommandKind::Create
                | CommandKind::Add
                | CommandKind::Remove
                | CommandKind::Clear
                | CommandKind::Delete
        )
    }
}

impl TryFrom<u32> for CommandKind {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => CommandKind::Create,
            1 => CommandKind::Add,
            2 => CommandKind::Remove,
            3 => CommandKind::Clear,
            4 => CommandKind::Delete,
            5 => CommandKind::Range,
            6 => CommandKind::Count,
            7 => CommandKind::Contains,
            other => return Err(Error::UnknownCommand(other)),
        })
    }
}

/// Kind-specific command payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    None,
    /// An explicit member list
    Members(Vec<u32>),
    /// Every multiple of `stride` in the closed range `[start, end]`
    Stride { start: u32, end: u32, stride: u32 },
    /// Up to `limit` members `>= start`
    Window { start: u32, limit: u64 },
}

impl Payload {
    pub fn name(&self) -> &'static str {
        match self {
            Payload::None => "none",
            Payload::Members(_) => "members",
            Payload::Stride { .. } => "stride",
            Payload::Window { .. } => "window",
        }
    }
}

impl Command {
    pub(crate) fn malformed(&self) -> Error {
        Error::MalformedPayload {
            kind: self.kind,
            payload: self.payload.name(),
        }
    }
}

/// A decoded command against one bitmap key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub key: Vec<u8>,
    pub kind: CommandKind,
    pub payload: Payload,
}

impl Command {
    pub fn new(key: impl Into<Vec<u8>>, kind: CommandKind, payload: Payload) -> Self {
        Command {
            key: key.into(),
            kind,
            payload,
        }
    }

    pub fn add(key: impl Into<Vec<u8>>, members: &[u32]) -> Self {
        Self::new(key, CommandKind::Add, Payload::Members(members.to_vec()))
    }

    pub fn add_stride(key: impl Into<Vec<u8>>, start: u32, end: u32, stride: u32) -> Self {
        Self::new(key, CommandKind::Add, Payload::Stride { start, end, stride })
    }

    pub fn remove(key: impl Into<Vec<u8>>, members: &[u32]) -> Self {
        Self::new(key, CommandKind::Remove, Payload::Members(members.to_vec()))
    }

    pub fn clear(key: impl Into<Vec<u8>>) -> Self {
        Self::new(key, CommandKind::Clear, Payload::None)
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self::new(key, CommandKind::Delete, Payload::None)
    }

    pub fn count(key: impl Into<Vec<u8>>) -> Self {
        Self::new(key, CommandKind::Count, Payload::None)
    }

    pub fn contains(key: impl Into<Vec<u8>>, members: &[u32]) -> Self {
        Self::new(key, CommandKind::Contains, Payload::Members(members.to_vec()))
    }

    pub fn range(key: impl Into<Vec<u8>>, start: u32, limit: u64) -> Self {
        Self::new(key, CommandKind::Range, Payload::Window { start, limit })
    }
}
