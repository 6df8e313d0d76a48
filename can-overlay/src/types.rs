//! Core types for the CAN overlay library
//!
//! This module defines the values that flow through one emission tick: the
//! field snapshot a rule reads and writes, the frame handed to the bus, and
//! the error type returned by the encoder-facing parts of the crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result type for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Named raw signal values of a single frame
///
/// Values are raw (before any DBC factor/offset), so a field that is only
/// passed through re-encodes to exactly the bits it was decoded from.
/// Field order is deterministic, which keeps traces and test output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSnapshot {
    fields: BTreeMap<String, i64>,
}

impl FieldSnapshot {
    /// Create an empty snapshot (used for fully system-originated frames)
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value, if present
    pub fn get(&self, name: &str) -> Option<i64> {
        self.fields.get(name).copied()
    }

    /// Insert or overwrite a field value
    pub fn set(&mut self, name: impl Into<String>, value: i64) {
        self.fields.insert(name.into(), value);
    }

    /// Builder method: set a field and return the snapshot
    pub fn with(mut self, name: impl Into<String>, value: i64) -> Self {
        self.set(name, value);
        self
    }

    /// True if the snapshot carries a value for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Overwrite `name` with `replacement` only when it currently equals one of `codes`
    pub fn replace_if(&mut self, name: &str, codes: &[i64], replacement: i64) {
        if let Some(value) = self.fields.get_mut(name) {
            if codes.contains(value) {
                *value = replacement;
            }
        }
    }

    /// Iterate over (field name, value) pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no fields are present
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for FieldSnapshot {
    fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<BTreeMap<String, i64>> for FieldSnapshot {
    fn from(fields: BTreeMap<String, i64>) -> Self {
        Self { fields }
    }
}

/// A CAN frame ready for transmission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanFrame {
    /// CAN message ID (11-bit or 29-bit)
    pub can_id: u32,
    /// Bus index the frame is sent on
    pub bus: u8,
    /// Encoded payload bytes
    pub data: Vec<u8>,
}

impl CanFrame {
    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bus {} 0x{:03X} [{}]", self.bus, self.can_id, self.dlc())?;
        for byte in &self.data {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// Errors raised while encoding or dispatching a frame
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Failed to parse DBC file: {0}")]
    DbcParseError(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Message not found: CAN ID 0x{0:X}")]
    UnknownMessageId(u32),

    #[error("Signal '{field}' is not defined for message {message}")]
    UnknownField { message: String, field: String },

    #[error("Signal '{field}' of message {message} is missing from the snapshot")]
    MissingField { message: String, field: String },

    #[error("Value {value} does not fit signal '{field}' of message {message}")]
    ValueOutOfRange {
        message: String,
        field: String,
        value: i64,
    },

    #[error("Frame {frame} is not carried by the {generation} generation")]
    UnsupportedFrame { frame: String, generation: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
