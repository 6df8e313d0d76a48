//! Frame catalogue
//!
//! Which logical frames each vehicle generation carries, the DBC message
//! that backs them, and the footer (rolling counter and/or checksum) the
//! receiving node expects.

use crate::sequencer::CounterWidth;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal names shared with the DBC
pub mod fields {
    pub const COUNTER: &str = "Counter";
    pub const CHECKSUM: &str = "Checksum";

    // Integrated steering command
    pub const LKAS_OUTPUT: &str = "LKAS_Output";
    pub const LKAS_REQUEST: &str = "LKAS_Request";
    pub const SET_1: &str = "SET_1";

    // Legacy steering command
    pub const LKAS_COMMAND: &str = "LKAS_Command";
    pub const LKAS_ACTIVE_REQUEST: &str = "LKAS_Active";

    pub const CRUISE_CANCEL: &str = "Cruise_Cancel";
    pub const CRUISE_BUTTON: &str = "Cruise_Button";

    // Lane-keep status / dash alert
    pub const LKAS_ALERT: &str = "LKAS_Alert";
    pub const KEEP_HANDS_ON_WHEEL: &str = "Keep_Hands_On_Wheel";
    pub const LKAS_ACTIVE: &str = "LKAS_ACTIVE";
    pub const LKAS_DASH_ICON: &str = "LKAS_Dash_Icon";
    pub const LEFT_LINE_ENABLE: &str = "LKAS_Left_Line_Enable";
    pub const RIGHT_LINE_ENABLE: &str = "LKAS_Right_Line_Enable";
    pub const LEFT_LINE_VISIBLE: &str = "LKAS_Left_Line_Visible";
    pub const RIGHT_LINE_VISIBLE: &str = "LKAS_Right_Line_Visible";

    pub const LKAS_STATE_MSG: &str = "LKAS_State_Msg";

    pub const THROTTLE_PEDAL: &str = "Throttle_Pedal";
    pub const SPEED: &str = "Speed";
}

/// Logical message identifier, stable across generations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameId {
    SteeringCommand,
    DistanceCancel,
    LaneKeepStatus,
    DashStatus,
    CruiseThrottle,
    Throttle,
    Brake,
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameId::SteeringCommand => "steering_command",
            FrameId::DistanceCancel => "distance_cancel",
            FrameId::LaneKeepStatus => "lane_keep_status",
            FrameId::DashStatus => "dash_status",
            FrameId::CruiseThrottle => "cruise_throttle",
            FrameId::Throttle => "throttle",
            FrameId::Brake => "brake",
        };
        write!(f, "{}", name)
    }
}

/// Vehicle generation, selects frame layouts and steering field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    /// Rolling counter (mod 16) on the steering command, no checksums
    #[default]
    Integrated,
    /// Pre-global: counter (mod 8) plus checksum byte on the steering
    /// command, checksum on the cruise throttle frame
    Legacy,
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Integrated => write!(f, "integrated"),
            Generation::Legacy => write!(f, "legacy"),
        }
    }
}

/// Rolling counter placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterField {
    pub name: &'static str,
    pub width: CounterWidth,
}

/// Checksum placement: the field and how many leading payload bytes it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumField {
    pub name: &'static str,
    pub covered_bytes: usize,
}

/// Everything the dispatcher needs to know about one frame of one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// DBC message name handed to the encoder
    pub message: &'static str,
    pub counter: Option<CounterField>,
    pub checksum: Option<ChecksumField>,
}

impl FrameLayout {
    const fn plain(message: &'static str) -> Self {
        Self {
            message,
            counter: None,
            checksum: None,
        }
    }
}

/// Steering command field names; both generations share one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteeringFields {
    pub torque: &'static str,
    pub request: &'static str,
    /// Protocol-required constant (name, value)
    pub constant: Option<(&'static str, i64)>,
}

const LEGACY_CHECKSUM: ChecksumField = ChecksumField {
    name: fields::CHECKSUM,
    covered_bytes: 7,
};

impl Generation {
    /// All frames this generation carries, in emission order
    pub fn frames(&self) -> &'static [FrameId] {
        match self {
            Generation::Integrated => &[
                FrameId::SteeringCommand,
                FrameId::DistanceCancel,
                FrameId::LaneKeepStatus,
                FrameId::DashStatus,
                FrameId::Throttle,
                FrameId::Brake,
            ],
            Generation::Legacy => &[
                FrameId::SteeringCommand,
                FrameId::CruiseThrottle,
                FrameId::Throttle,
                FrameId::Brake,
            ],
        }
    }

    /// Layout of `frame`, or None if this generation does not carry it
    pub fn layout(&self, frame: FrameId) -> Option<FrameLayout> {
        let layout = match (self, frame) {
            (Generation::Integrated, FrameId::SteeringCommand) => FrameLayout {
                message: "ES_LKAS",
                counter: Some(CounterField {
                    name: fields::COUNTER,
                    width: CounterWidth::Mod16,
                }),
                checksum: None,
            },
            (Generation::Integrated, FrameId::DistanceCancel) => FrameLayout::plain("ES_Distance"),
            (Generation::Integrated, FrameId::LaneKeepStatus) => FrameLayout::plain("ES_LKAS_State"),
            (Generation::Integrated, FrameId::DashStatus) => FrameLayout::plain("ES_DashStatus"),
            (Generation::Legacy, FrameId::SteeringCommand) => FrameLayout {
                message: "ES_LKAS",
                counter: Some(CounterField {
                    name: fields::COUNTER,
                    width: CounterWidth::Mod8,
                }),
                checksum: Some(LEGACY_CHECKSUM),
            },
            (Generation::Legacy, FrameId::CruiseThrottle) => FrameLayout {
                message: "ES_CruiseThrottle",
                counter: None,
                checksum: Some(LEGACY_CHECKSUM),
            },
            (_, FrameId::Throttle) => FrameLayout::plain("Throttle"),
            (_, FrameId::Brake) => FrameLayout::plain("Brake_Pedal"),
            _ => return None,
        };
        Some(layout)
    }

    /// Steering command field names for this generation
    pub fn steering_fields(&self) -> SteeringFields {
        match self {
            Generation::Integrated => SteeringFields {
                torque: fields::LKAS_OUTPUT,
                request: fields::LKAS_REQUEST,
                constant: Some((fields::SET_1, 1)),
            },
            Generation::Legacy => SteeringFields {
                torque: fields::LKAS_COMMAND,
                request: fields::LKAS_ACTIVE_REQUEST,
                constant: None,
            },
        }
    }
}
