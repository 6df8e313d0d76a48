//! Field overlay rules
//!
//! One rule per logical frame. Each rule copies the stock snapshot, applies
//! its overrides, and returns the copy; the caller's snapshot is never
//! touched. Rules are total: a field missing from stock is the encoder's
//! problem, not theirs.

use crate::alerts;
use crate::command::Command;
use crate::config::{AlertPolicy, DiagnosticOverrides};
use crate::frames::fields;
use crate::frames::{FrameId, SteeringFields};
use crate::types::FieldSnapshot;

/// Dash icon code for "lane keep engaged"
pub const DASH_ICON_ENGAGED: i64 = 2;
/// Dash status code stock shows when its own lane keep is disabled
pub const LKAS_DISABLED_MSG: i64 = 3;

/// Per-call switches that are not part of the command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayFlags {
    pub alert_policy: AlertPolicy,
    pub diagnostics: DiagnosticOverrides,
}

/// Run the rule for `frame`
///
/// The steering rule is the only one that depends on the generation, and
/// only through its field names.
pub fn apply(
    frame: FrameId,
    steering: &SteeringFields,
    stock: &FieldSnapshot,
    command: &Command,
    flags: &OverlayFlags,
) -> FieldSnapshot {
    match frame {
        FrameId::SteeringCommand => steering_command(steering, command),
        FrameId::DistanceCancel => distance_cancel(stock, command),
        FrameId::LaneKeepStatus => lane_keep_status(stock, command, flags.alert_policy),
        FrameId::DashStatus => dash_status(stock),
        FrameId::CruiseThrottle => cruise_throttle(stock, command),
        FrameId::Throttle => throttle(stock, &flags.diagnostics),
        FrameId::Brake => brake(stock, &flags.diagnostics),
    }
}

/// Steering command; fully system-originated
///
/// The rolling counter and checksum are footers and are added by the
/// dispatcher after this rule runs.
pub fn steering_command(names: &SteeringFields, command: &Command) -> FieldSnapshot {
    let mut values = FieldSnapshot::new()
        .with(names.torque, command.steer_torque)
        .with(names.request, i64::from(command.steer_torque != 0));

    if let Some((name, value)) = names.constant {
        values.set(name, value);
    }

    values
}

/// Distance/cancel: forward stock as-is, owning only the cancel bit
pub fn distance_cancel(stock: &FieldSnapshot, command: &Command) -> FieldSnapshot {
    let mut values = stock.clone();
    if command.cancel {
        values.set(fields::CRUISE_CANCEL, 1);
    }
    values
}

/// Lane-keep status and dash alert
pub fn lane_keep_status(
    stock: &FieldSnapshot,
    command: &Command,
    policy: AlertPolicy,
) -> FieldSnapshot {
    let mut values = stock.clone();

    alerts::arbitrate(&mut values, command, policy);

    if command.active {
        values.set(fields::LKAS_ACTIVE, 1);
        values.set(fields::LKAS_DASH_ICON, DASH_ICON_ENGAGED);
        values.set(fields::LEFT_LINE_ENABLE, 1);
        values.set(fields::RIGHT_LINE_ENABLE, 1);
    } else {
        // LKAS_ACTIVE stays stock so the steering wheel button still
        // toggles the display; only the engaged icon is hidden.
        values.set(fields::LKAS_DASH_ICON, 0);
    }

    values.set(fields::LEFT_LINE_VISIBLE, i64::from(command.left_line_visible));
    values.set(fields::RIGHT_LINE_VISIBLE, i64::from(command.right_line_visible));

    values
}

/// Dash status: hide stock's "LKAS disabled" message
pub fn dash_status(stock: &FieldSnapshot) -> FieldSnapshot {
    let mut values = stock.clone();
    values.replace_if(fields::LKAS_STATE_MSG, &[LKAS_DISABLED_MSG], 0);
    values
}

/// Legacy cruise throttle: forward stock with the commanded button
pub fn cruise_throttle(stock: &FieldSnapshot, command: &Command) -> FieldSnapshot {
    let mut values = stock.clone();
    values.set(fields::CRUISE_BUTTON, command.cruise_button);
    values
}

/// Throttle (diagnostic)
pub fn throttle(stock: &FieldSnapshot, overrides: &DiagnosticOverrides) -> FieldSnapshot {
    let mut values = stock.clone();
    if let Some(pedal) = overrides.throttle_pedal {
        values.set(fields::THROTTLE_PEDAL, pedal);
    }
    values
}

/// Brake pedal (diagnostic)
pub fn brake(stock: &FieldSnapshot, overrides: &DiagnosticOverrides) -> FieldSnapshot {
    let mut values = stock.clone();
    if let Some(speed) = overrides.brake_speed {
        values.set(fields::SPEED, speed);
    }
    values
}
