//! DBC-driven frame encoder
//!
//! Packs raw signal values into CAN payloads and unpacks them again, using
//! message layouts loaded from DBC files. The synthesizer only talks to the
//! `FrameEncoder` trait; `DbcPacker` is the implementation the CLI and tests
//! use.

use crate::signals::database::{ByteOrder, MessageDefinition, SignalDefinition, ValueType};
use crate::signals::{DatabaseStats, SignalDatabase};
use crate::types::{CanFrame, FieldSnapshot, OverlayError, Result};
use std::path::Path;

/// Turns a named-field snapshot into a transmittable frame
pub trait FrameEncoder {
    /// Encode `values` as the DBC message `message`
    ///
    /// Implementations own schema validation: unknown or missing fields
    /// are reported here.
    fn encode(&self, message: &str, bus: u8, values: &FieldSnapshot) -> Result<CanFrame>;
}

impl<E: FrameEncoder + ?Sized> FrameEncoder for &E {
    fn encode(&self, message: &str, bus: u8, values: &FieldSnapshot) -> Result<CanFrame> {
        (**self).encode(message, bus, values)
    }
}

/// Frame encoder/decoder backed by a DBC signal database
pub struct DbcPacker {
    signal_db: SignalDatabase,
    /// Encode signals absent from the snapshot as 0 instead of failing
    missing_as_zero: bool,
}

impl DbcPacker {
    /// Create a packer with an empty database
    pub fn new() -> Self {
        Self {
            signal_db: SignalDatabase::new(),
            missing_as_zero: false,
        }
    }

    /// Create a packer from DBC text
    pub fn from_dbc_str(content: &str) -> Result<Self> {
        let mut packer = Self::new();
        packer.add_dbc_str(content, "inline.dbc")?;
        Ok(packer)
    }

    /// Builder method: encode missing signals as 0
    pub fn with_missing_as_zero(mut self, enabled: bool) -> Self {
        self.missing_as_zero = enabled;
        self
    }

    /// Load a DBC file and add its definitions to the signal database
    pub fn add_dbc(&mut self, path: &Path) -> Result<()> {
        log::info!("Loading DBC file: {:?}", path);

        for message in crate::signals::dbc::parse_dbc_file(path)? {
            self.signal_db.add_message(message);
        }

        log::info!("DBC file loaded successfully: {:?}", path);
        Ok(())
    }

    /// Add definitions from DBC text
    pub fn add_dbc_str(&mut self, content: &str, source: &str) -> Result<()> {
        for message in crate::signals::dbc::parse_dbc_str(content, source)? {
            self.signal_db.add_message(message);
        }
        Ok(())
    }

    /// Get statistics about the loaded signal database
    pub fn database_stats(&self) -> DatabaseStats {
        self.signal_db.stats()
    }

    /// Look up a message definition by name
    pub fn message(&self, name: &str) -> Option<&MessageDefinition> {
        self.signal_db.get_message_by_name(name)
    }

    /// Pack `values` into a frame for `message`
    pub fn pack(&self, message: &str, bus: u8, values: &FieldSnapshot) -> Result<CanFrame> {
        let message_def = self
            .signal_db
            .get_message_by_name(message)
            .ok_or_else(|| OverlayError::MessageNotFound(message.to_string()))?;

        if let Some((field, _)) = values.iter().find(|(name, _)| message_def.signal(name).is_none()) {
            return Err(OverlayError::UnknownField {
                message: message.to_string(),
                field: field.to_string(),
            });
        }

        let mut data = vec![0u8; message_def.size];

        for signal in &message_def.signals {
            let value = match values.get(&signal.name) {
                Some(value) => value,
                None if self.missing_as_zero => 0,
                None => {
                    return Err(OverlayError::MissingField {
                        message: message.to_string(),
                        field: signal.name.clone(),
                    })
                }
            };

            let (min, max) = signal.raw_range();
            if value < min || value > max {
                return Err(OverlayError::ValueOutOfRange {
                    message: message.to_string(),
                    field: signal.name.clone(),
                    value,
                });
            }

            Self::insert_signal_value(&mut data, signal, value)?;
        }

        Ok(CanFrame {
            can_id: message_def.id,
            bus,
            data,
        })
    }

    /// Unpack a frame into its message name and raw field values
    pub fn unpack(&self, can_id: u32, data: &[u8]) -> Result<(String, FieldSnapshot)> {
        let message_def = self
            .signal_db
            .get_message(can_id)
            .ok_or(OverlayError::UnknownMessageId(can_id))?;

        if data.len() < message_def.size {
            return Err(OverlayError::InvalidData(format!(
                "{} needs {} bytes, got {}",
                message_def.name,
                message_def.size,
                data.len()
            )));
        }

        let mut values = FieldSnapshot::new();
        for signal in &message_def.signals {
            values.set(signal.name.clone(), Self::extract_signal_value(data, signal)?);
        }

        Ok((message_def.name.clone(), values))
    }

    /// Write a raw value into the payload
    fn insert_signal_value(data: &mut [u8], signal: &SignalDefinition, value: i64) -> Result<()> {
        let positions = Self::bit_positions(signal, data.len())?;
        let length = positions.len();
        let raw = (value as u64) & Self::mask(length);

        for (i, bit_pos) in positions.into_iter().enumerate() {
            // Intel positions run LSB first, Motorola positions MSB first
            let bit_value = match signal.byte_order {
                ByteOrder::LittleEndian => (raw >> i) & 0x01,
                ByteOrder::BigEndian => (raw >> (length - 1 - i)) & 0x01,
            };

            let byte = &mut data[bit_pos / 8];
            let bit_in_byte = bit_pos % 8;
            if bit_value == 1 {
                *byte |= 1 << bit_in_byte;
            } else {
                *byte &= !(1 << bit_in_byte);
            }
        }

        Ok(())
    }

    /// Read a raw value from the payload
    fn extract_signal_value(data: &[u8], signal: &SignalDefinition) -> Result<i64> {
        let positions = Self::bit_positions(signal, data.len())?;
        let length = positions.len();
        let mut raw: u64 = 0;

        for (i, bit_pos) in positions.into_iter().enumerate() {
            let bit_value = u64::from((data[bit_pos / 8] >> (bit_pos % 8)) & 0x01);
            match signal.byte_order {
                ByteOrder::LittleEndian => raw |= bit_value << i,
                ByteOrder::BigEndian => raw |= bit_value << (length - 1 - i),
            }
        }

        Ok(match signal.value_type {
            ValueType::Unsigned => raw as i64,
            ValueType::Signed => Self::sign_extend(raw, length),
        })
    }

    /// Payload bit positions covered by a signal
    ///
    /// Position `p` is bit `p % 8` (0 = LSB) of byte `p / 8`. Intel signals
    /// are listed LSB first; Motorola signals MSB first, following the DBC
    /// sawtooth numbering where the start bit is the MSB.
    fn bit_positions(signal: &SignalDefinition, payload_len: usize) -> Result<Vec<usize>> {
        let length = usize::from(signal.length);
        let mut positions = Vec::with_capacity(length);
        let mut bit_pos = usize::from(signal.start_bit);

        for _ in 0..length {
            positions.push(bit_pos);
            match signal.byte_order {
                ByteOrder::LittleEndian => bit_pos += 1,
                ByteOrder::BigEndian if bit_pos % 8 == 0 => bit_pos += 15,
                ByteOrder::BigEndian => bit_pos -= 1,
            }
        }

        match positions.iter().max() {
            Some(&last) if last / 8 >= payload_len => Err(OverlayError::InvalidData(format!(
                "Signal '{}' needs {} bytes but frame only has {} bytes",
                signal.name,
                last / 8 + 1,
                payload_len
            ))),
            _ => Ok(positions),
        }
    }

    fn mask(length: usize) -> u64 {
        if length >= 64 {
            !0
        } else {
            (1u64 << length) - 1
        }
    }

    /// Sign-extend a value from N bits to 64 bits
    fn sign_extend(value: u64, bit_length: usize) -> i64 {
        if bit_length == 0 || bit_length >= 64 {
            return value as i64;
        }

        let sign_bit = 1u64 << (bit_length - 1);
        if (value & sign_bit) != 0 {
            let mask = !0u64 << bit_length;
            (value | mask) as i64
        } else {
            value as i64
        }
    }
}

impl Default for DbcPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder for DbcPacker {
    fn encode(&self, message: &str, bus: u8, values: &FieldSnapshot) -> Result<CanFrame> {
        self.pack(message, bus, values)
    }
}
