//! Signal database
//!
//! Combines message definitions from one or more DBC files into a single
//! database, queryable by CAN ID and by message name.

use std::collections::HashMap;

/// A complete CAN message definition
#[derive(Debug, Clone)]
pub struct MessageDefinition {
    /// CAN message ID
    pub id: u32,
    /// Message name
    pub name: String,
    /// Message size in bytes
    pub size: usize,
    /// Sender ECU name (optional)
    pub sender: Option<String>,
    /// All packable signals in this message
    pub signals: Vec<SignalDefinition>,
    /// Source file (DBC filename)
    pub source: String,
}

impl MessageDefinition {
    /// Find a signal by name
    pub fn signal(&self, name: &str) -> Option<&SignalDefinition> {
        self.signals.iter().find(|s| s.name == name)
    }
}

/// A CAN signal definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalDefinition {
    /// Signal name
    pub name: String,
    /// Start bit in the CAN frame (DBC numbering)
    pub start_bit: u16,
    /// Length in bits
    pub length: u16,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
}

impl SignalDefinition {
    /// Smallest and largest raw value the signal can carry
    pub fn raw_range(&self) -> (i64, i64) {
        let length = u32::from(self.length.min(64));
        match self.value_type {
            ValueType::Unsigned if length >= 63 => (0, i64::MAX),
            ValueType::Unsigned => (0, (1i64 << length) - 1),
            ValueType::Signed if length >= 64 => (i64::MIN, i64::MAX),
            ValueType::Signed => (-(1i64 << (length - 1)), (1i64 << (length - 1)) - 1),
        }
    }
}

/// Byte order for signal packing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Value type for signal interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Signed integer
    Signed,
    /// Unsigned integer
    Unsigned,
}

/// The signal database
pub struct SignalDatabase {
    /// All message definitions by CAN ID
    messages: HashMap<u32, MessageDefinition>,

    /// Message name lookup
    /// Key: Message name, Value: CAN ID
    message_lookup: HashMap<String, u32>,
}

impl SignalDatabase {
    /// Create a new empty signal database
    pub fn new() -> Self {
        Self {
            messages: HashMap::new(),
            message_lookup: HashMap::new(),
        }
    }

    /// Add a message definition to the database
    ///
    /// A later definition for the same CAN ID replaces the earlier one.
    pub fn add_message(&mut self, message: MessageDefinition) {
        let can_id = message.id;

        if let Some(previous) = self.messages.get(&can_id) {
            log::warn!(
                "Message 0x{:X} from {} replaces {} from {}",
                can_id,
                message.source,
                previous.name,
                previous.source
            );
            self.message_lookup.remove(&previous.name);
        }

        self.message_lookup.insert(message.name.clone(), can_id);
        self.messages.insert(can_id, message);
    }

    /// Get a message definition by CAN ID
    pub fn get_message(&self, can_id: u32) -> Option<&MessageDefinition> {
        self.messages.get(&can_id)
    }

    /// Get a message definition by name
    pub fn get_message_by_name(&self, message_name: &str) -> Option<&MessageDefinition> {
        self.message_lookup
            .get(message_name)
            .and_then(|can_id| self.messages.get(can_id))
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        let num_messages = self.messages.len();
        let num_signals: usize = self.messages.values().map(|msg| msg.signals.len()).sum();

        DatabaseStats {
            num_messages,
            num_signals,
        }
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of message definitions
    pub num_messages: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
}

impl Default for SignalDatabase {
    fn default() -> Self {
        Self::new()
    }
}
