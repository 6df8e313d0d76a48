//! Checksum engine for the legacy frame family
//!
//! The checksum covers encoded payload bytes, not field values, so sealing
//! a snapshot takes a provisional encode with a placeholder checksum, the
//! sum over that payload, and a second encode by the caller.

use crate::frames::ChecksumField;
use crate::packer::FrameEncoder;
use crate::types::{FieldSnapshot, Result};

/// Sum of the first `covered` bytes of `data`, mod 256
pub fn checksum(data: &[u8], covered: usize) -> u8 {
    data.iter()
        .take(covered)
        .fold(0u8, |acc, byte| acc.wrapping_add(*byte))
}

/// Write the checksum for `snapshot` into its checksum field
///
/// Runs the provisional encode. The caller still owns the final encode.
pub fn seal_checksum<E: FrameEncoder + ?Sized>(
    encoder: &E,
    message: &str,
    bus: u8,
    field: ChecksumField,
    snapshot: &mut FieldSnapshot,
) -> Result<u8> {
    snapshot.set(field.name, 0);
    let provisional = encoder.encode(message, bus, snapshot)?;
    let sum = checksum(&provisional.data, field.covered_bytes);

    log::trace!(
        "{}: provisional payload {:02X?} -> checksum 0x{:02X}",
        message,
        provisional.data,
        sum
    );

    snapshot.set(field.name, i64::from(sum));
    Ok(sum)
}
