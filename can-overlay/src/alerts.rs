//! Alert arbiter for the lane-keep status frame
//!
//! Decides, for one tick, whether a stock alert is cleared, replaced by a
//! system alert, or left alone. Steps run in a fixed order: stock
//! suppression first, then system alerts, so a code cleared this tick can
//! only come back if the system asks for it.

use crate::command::{Command, VisualAlert};
use crate::config::AlertPolicy;
use crate::frames::fields::{KEEP_HANDS_ON_WHEEL, LKAS_ALERT};
use crate::types::FieldSnapshot;

/// `LKAS_Alert` value meaning no alert
pub const NO_ALERT: i64 = 0;
/// Stock tone played when stock lane-keep disengages
pub const DISENGAGE_TONE: i64 = 27;
pub const RIGHT_DEPARTURE: i64 = 11;
pub const LEFT_DEPARTURE: i64 = 12;

/// Apply the arbiter to `values` in place
pub fn arbitrate(values: &mut FieldSnapshot, command: &Command, policy: AlertPolicy) {
    let clear_stock_lkas = match policy {
        AlertPolicy::Reference => command.active,
        AlertPolicy::Unconditional => true,
    };

    // Hands-on warning is redundant with system monitoring while engaged;
    // tone 27 would sound a false disengagement chime.
    if clear_stock_lkas {
        values.replace_if(KEEP_HANDS_ON_WHEEL, &[1], 0);
        values.replace_if(LKAS_ALERT, &[DISENGAGE_TONE], NO_ALERT);
    }

    values.replace_if(LKAS_ALERT, &[RIGHT_DEPARTURE, LEFT_DEPARTURE], NO_ALERT);

    if command.visual_alert == VisualAlert::SteerRequired {
        values.set(KEEP_HANDS_ON_WHEEL, 1);
    }

    // Never overwrite a stock alert that survived suppression (e.g. FCW).
    let alert_free = values.get(LKAS_ALERT).unwrap_or(NO_ALERT) == NO_ALERT;
    if alert_free {
        if let Some(code) = departure_code(command) {
            values.set(LKAS_ALERT, code);
        }
    }
}

/// Departure code for the command, left before right
fn departure_code(command: &Command) -> Option<i64> {
    if !command.visual_alert.is_lane_departure() {
        return None;
    }

    if command.left_lane_depart {
        Some(LEFT_DEPARTURE)
    } else if command.right_lane_depart {
        Some(RIGHT_DEPARTURE)
    } else {
        match command.visual_alert {
            VisualAlert::LaneDepartureLeft => Some(LEFT_DEPARTURE),
            VisualAlert::LaneDepartureRight => Some(RIGHT_DEPARTURE),
            _ => None,
        }
    }
}
