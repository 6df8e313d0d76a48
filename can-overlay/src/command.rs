//! Per-tick command from the upstream control loop

use serde::{Deserialize, Serialize};

/// Visual alert requested by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualAlert {
    #[default]
    None,
    SteerRequired,
    LaneDepartureLeft,
    LaneDepartureRight,
    /// Side comes from the command's departure flags
    LaneDepartureGeneric,
}

impl VisualAlert {
    pub fn is_lane_departure(&self) -> bool {
        matches!(
            self,
            VisualAlert::LaneDepartureLeft
                | VisualAlert::LaneDepartureRight
                | VisualAlert::LaneDepartureGeneric
        )
    }
}

/// Locally computed intent for one emission tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Command {
    /// Requested steering torque (raw units); 0 means no request
    pub steer_torque: i64,
    /// Driver assistance is currently commanding the vehicle
    pub active: bool,
    pub visual_alert: VisualAlert,
    pub left_line_visible: bool,
    pub right_line_visible: bool,
    pub left_lane_depart: bool,
    pub right_lane_depart: bool,
    /// Cruise button code for the legacy throttle frame
    pub cruise_button: i64,
    /// Ask the cruise controller to cancel
    pub cancel: bool,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set requested torque
    pub fn with_torque(mut self, torque: i64) -> Self {
        self.steer_torque = torque;
        self
    }

    /// Builder method: set assist state
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builder method: set the requested visual alert
    pub fn with_alert(mut self, alert: VisualAlert) -> Self {
        self.visual_alert = alert;
        self
    }

    /// Builder method: set lane line visibility
    pub fn with_lines(mut self, left: bool, right: bool) -> Self {
        self.left_line_visible = left;
        self.right_line_visible = right;
        self
    }

    /// Builder method: set lane departure flags
    pub fn with_departure(mut self, left: bool, right: bool) -> Self {
        self.left_lane_depart = left;
        self.right_lane_depart = right;
        self
    }

    /// Builder method: set cruise button code
    pub fn with_cruise_button(mut self, button: i64) -> Self {
        self.cruise_button = button;
        self
    }

    /// Builder method: request a cruise cancel
    pub fn with_cancel(mut self, cancel: bool) -> Self {
        self.cancel = cancel;
        self
    }
}
