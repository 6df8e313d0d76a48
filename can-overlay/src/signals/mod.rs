//! Signal database and DBC parser
//!
//! This module loads message layouts from DBC files into a database the
//! reference packer encodes and decodes against.

pub mod dbc;
pub mod database;

// Re-export key types for convenience
pub use database::{
    ByteOrder, DatabaseStats, MessageDefinition, SignalDatabase, SignalDefinition, ValueType,
};
