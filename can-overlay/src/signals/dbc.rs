//! DBC file parser
//!
//! Parses Vector DBC files and converts them into our internal signal database format.

use crate::signals::database::{ByteOrder, MessageDefinition, SignalDefinition, ValueType};
use crate::types::{OverlayError, Result};
use std::path::Path;

/// Parse a DBC file and return message definitions
pub fn parse_dbc_file(path: &Path) -> Result<Vec<MessageDefinition>> {
    log::info!("Parsing DBC file: {:?}", path);

    // Read the DBC file as bytes first (handle non-UTF8 encodings)
    let bytes = std::fs::read(path).map_err(|e| {
        OverlayError::DbcParseError(format!("Failed to read file {:?}: {}", path, e))
    })?;

    // Try UTF-8 first, then fall back to Latin-1 (compatible with Windows-1252)
    let dbc_content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("DBC file is not UTF-8, trying Latin-1 encoding");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    let source_filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.dbc");

    let messages = parse_dbc_str(&dbc_content, source_filename)?;

    log::info!("Parsed {} messages from {:?}", messages.len(), path);

    Ok(messages)
}

/// Parse DBC text; `source` names it in log output and message definitions
pub fn parse_dbc_str(content: &str, source: &str) -> Result<Vec<MessageDefinition>> {
    let dbc = can_dbc::DBC::from_slice(content.as_bytes()).map_err(|e| {
        OverlayError::DbcParseError(format!("Failed to parse DBC {}: {:?}", source, e))
    })?;

    Ok(dbc
        .messages()
        .iter()
        .map(|dbc_msg| convert_message(dbc_msg, source))
        .collect())
}

/// Convert a can-dbc message to our MessageDefinition
///
/// Multiplexed signals are skipped; none of the frames this crate emits
/// are multiplexed, and packing them needs the multiplexer value.
fn convert_message(dbc_msg: &can_dbc::Message, source: &str) -> MessageDefinition {
    let mut signals = Vec::new();

    for dbc_sig in dbc_msg.signals() {
        if matches!(
            dbc_sig.multiplexer_indicator(),
            can_dbc::MultiplexIndicator::MultiplexedSignal(_)
        ) {
            log::warn!(
                "Skipping multiplexed signal {}.{}",
                dbc_msg.message_name(),
                dbc_sig.name()
            );
            continue;
        }
        signals.push(convert_signal(dbc_sig));
    }

    MessageDefinition {
        id: dbc_msg.message_id().0,
        name: dbc_msg.message_name().to_string(),
        size: *dbc_msg.message_size() as usize,
        sender: match dbc_msg.transmitter() {
            can_dbc::Transmitter::NodeName(name) => Some(name.to_string()),
            _ => None,
        },
        signals,
        source: source.to_string(),
    }
}

/// Convert a can-dbc signal to our SignalDefinition
fn convert_signal(dbc_sig: &can_dbc::Signal) -> SignalDefinition {
    let byte_order = match *dbc_sig.byte_order() {
        can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
        can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    let value_type = match *dbc_sig.value_type() {
        can_dbc::ValueType::Signed => ValueType::Signed,
        can_dbc::ValueType::Unsigned => ValueType::Unsigned,
    };

    SignalDefinition {
        name: dbc_sig.name().to_string(),
        start_bit: *dbc_sig.start_bit() as u16,
        length: *dbc_sig.signal_size() as u16,
        byte_order,
        value_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const STEERING_DBC: &str = r#"
VERSION ""

NS_ :

BS_:

BU_: ES EPS

BO_ 290 ES_LKAS: 8 ES
 SG_ SET_1 : 8|1@1+ (1,0) [0|1] "" EPS
 SG_ LKAS_Output : 16|13@1- (1,0) [-4096|4095] "" EPS
 SG_ LKAS_Request : 29|1@1+ (1,0) [0|1] "" EPS
 SG_ Counter : 48|4@1+ (1,0) [0|15] "" EPS
"#;

    #[test]
    fn test_parse_dbc_str() {
        let messages = parse_dbc_str(STEERING_DBC, "inline.dbc").unwrap();

        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert_eq!(msg.id, 290);
        assert_eq!(msg.name, "ES_LKAS");
        assert_eq!(msg.size, 8);
        assert_eq!(msg.sender, Some("ES".to_string()));
        assert_eq!(msg.signals.len(), 4);
        assert_eq!(msg.source, "inline.dbc");

        let torque = msg.signal("LKAS_Output").unwrap();
        assert_eq!(torque.start_bit, 16);
        assert_eq!(torque.length, 13);
        assert_eq!(torque.value_type, ValueType::Signed);
        assert_eq!(torque.byte_order, ByteOrder::LittleEndian);
    }

    #[test]
    fn test_parse_dbc_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(STEERING_DBC.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let messages = parse_dbc_file(temp_file.path()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].signals[3].name, "Counter");
    }

    #[test]
    fn test_missing_file() {
        let result = parse_dbc_file(Path::new("does/not/exist.dbc"));
        assert!(matches!(result, Err(OverlayError::DbcParseError(_))));
    }

    #[test]
    fn test_multiplexed_signals_are_skipped() {
        let dbc_content = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1

BO_ 512 MultiplexedMsg: 8 ECU1
 SG_ Mode M : 0|8@1+ (1,0) [0|3] "" ECU1
 SG_ SignalA m0 : 8|16@1+ (1,0) [0|100] "%" ECU1
 SG_ SignalB m1 : 8|16@1+ (0.1,0) [0|1000] "mV" ECU1
"#;

        let messages = parse_dbc_str(dbc_content, "mux.dbc").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].signals.len(), 1);
        assert_eq!(messages[0].signals[0].name, "Mode");
    }
}
