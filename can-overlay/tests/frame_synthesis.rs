// End-to-end frame synthesis against the fixture DBC files
use can_overlay::checksum::checksum;
use can_overlay::frames::fields;
use can_overlay::{
    Command, DbcPacker, FieldSnapshot, FrameId, FrameSynthesizer, Generation, OverlayError,
    SynthesizerConfig, VisualAlert,
};
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn packer(dbc: &str) -> DbcPacker {
    let mut packer = DbcPacker::new();
    packer.add_dbc(&fixture(dbc)).unwrap();
    packer
}

fn integrated() -> FrameSynthesizer<DbcPacker> {
    let config = SynthesizerConfig::new().with_steer_step(NonZeroU64::new(2).unwrap());
    FrameSynthesizer::new(config, packer("subaru_global.dbc"))
}

fn legacy() -> FrameSynthesizer<DbcPacker> {
    let config = SynthesizerConfig::new().with_generation(Generation::Legacy);
    FrameSynthesizer::new(config, packer("subaru_preglobal.dbc"))
}

fn lkas_state_stock() -> FieldSnapshot {
    FieldSnapshot::new()
        .with(fields::LKAS_ALERT, 27)
        .with(fields::KEEP_HANDS_ON_WHEEL, 1)
        .with(fields::LKAS_ACTIVE, 0)
        .with(fields::LKAS_DASH_ICON, 1)
        .with(fields::LEFT_LINE_ENABLE, 0)
        .with(fields::RIGHT_LINE_ENABLE, 0)
        .with(fields::LEFT_LINE_VISIBLE, 1)
        .with(fields::RIGHT_LINE_VISIBLE, 1)
}

#[test]
fn test_integrated_steering_frame() {
    let synthesizer = integrated();
    let command = Command::new().with_active(true).with_torque(200);

    let frame = synthesizer
        .synthesize(
            FrameId::SteeringCommand,
            &FieldSnapshot::new(),
            &command,
            synthesizer.config().sequence(6),
        )
        .unwrap();

    assert_eq!(frame.can_id, 290);
    assert_eq!(frame.bus, 0);
    // SET_1, torque 200, request bit, counter 6 / 2 = 3
    assert_eq!(frame.data, vec![0x00, 0x01, 0xC8, 0x20, 0x00, 0x00, 0x03, 0x00]);
}

#[test]
fn test_integrated_counter_wraps_at_16() {
    let synthesizer = integrated();
    let command = Command::new().with_torque(1);

    let counters: Vec<u8> = [0, 1, 2, 30, 31, 32]
        .iter()
        .map(|&tick| {
            synthesizer
                .synthesize(
                    FrameId::SteeringCommand,
                    &FieldSnapshot::new(),
                    &command,
                    synthesizer.config().sequence(tick),
                )
                .unwrap()
                .data[6]
        })
        .collect();

    assert_eq!(counters, vec![0, 0, 1, 15, 15, 0]);
}

#[test]
fn test_zero_torque_clears_request() {
    let synthesizer = integrated();
    let frame = synthesizer
        .synthesize(
            FrameId::SteeringCommand,
            &FieldSnapshot::new(),
            &Command::new(),
            synthesizer.config().sequence(0),
        )
        .unwrap();

    let (_, values) = synthesizer.encoder().unpack(frame.can_id, &frame.data).unwrap();
    assert_eq!(values.get(fields::LKAS_REQUEST), Some(0));
    assert_eq!(values.get(fields::SET_1), Some(1));
}

#[test]
fn test_legacy_steering_checksum() {
    let synthesizer = legacy();
    let command = Command::new().with_active(true).with_torque(100);

    let frame = synthesizer
        .synthesize(
            FrameId::SteeringCommand,
            &FieldSnapshot::new(),
            &command,
            synthesizer.config().sequence(0),
        )
        .unwrap();
    assert_eq!(frame.can_id, 356);
    assert_eq!(frame.data, vec![0x64, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x65]);

    // 13 % 8 = 5 -> counter byte changes, checksum follows
    let frame = synthesizer
        .synthesize(
            FrameId::SteeringCommand,
            &FieldSnapshot::new(),
            &command,
            synthesizer.config().sequence(13),
        )
        .unwrap();
    assert_eq!(frame.data[4], 0x05);
    assert_eq!(frame.data[7], 0x6A);
    assert_eq!(frame.data[7], checksum(&frame.data, 7));
}

#[test]
fn test_legacy_negative_torque_checksum() {
    let synthesizer = legacy();
    let command = Command::new().with_active(true).with_torque(-100);

    let frame = synthesizer
        .synthesize(
            FrameId::SteeringCommand,
            &FieldSnapshot::new(),
            &command,
            synthesizer.config().sequence(0),
        )
        .unwrap();

    assert_eq!(&frame.data[..4], &[0x9C, 0x1F, 0x00, 0x01]);
    assert_eq!(frame.data[7], 188);
}

#[test]
fn test_legacy_cruise_throttle_replaces_stale_checksum() {
    let synthesizer = legacy();
    let stock = FieldSnapshot::new()
        .with(fields::CRUISE_BUTTON, 0)
        .with("Throttle_Cruise", 1200)
        .with(fields::CHECKSUM, 0x55);

    let frame = synthesizer
        .synthesize(
            FrameId::CruiseThrottle,
            &stock,
            &Command::new().with_cruise_button(2),
            synthesizer.config().sequence(0),
        )
        .unwrap();

    assert_eq!(frame.can_id, 328);
    assert_eq!(&frame.data[..3], &[0x02, 0xB0, 0x04]);
    assert_eq!(frame.data[7], 0xB6);
    assert_eq!(stock.get(fields::CHECKSUM), Some(0x55));
}

#[test]
fn test_distance_passthrough_is_bit_exact() {
    let synthesizer = integrated();
    let observed = [0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let (name, stock) = synthesizer.encoder().unpack(545, &observed).unwrap();
    assert_eq!(name, "ES_Distance");
    assert_eq!(stock.get(fields::SPEED), Some(42));

    let frame = synthesizer
        .synthesize(
            FrameId::DistanceCancel,
            &stock,
            &Command::new(),
            synthesizer.config().sequence(0),
        )
        .unwrap();
    assert_eq!(frame.data, observed.to_vec());

    let frame = synthesizer
        .synthesize(
            FrameId::DistanceCancel,
            &stock,
            &Command::new().with_cancel(true),
            synthesizer.config().sequence(0),
        )
        .unwrap();
    assert_eq!(frame.data[0], 0x2A);
    assert_eq!(frame.data[7], 0x01);
}

#[test]
fn test_lane_keep_state_active() {
    let synthesizer = integrated();
    let command = Command::new().with_active(true).with_lines(true, false);

    let frame = synthesizer
        .synthesize(
            FrameId::LaneKeepStatus,
            &lkas_state_stock(),
            &command,
            synthesizer.config().sequence(0),
        )
        .unwrap();

    assert_eq!(frame.can_id, 802);
    assert_eq!(frame.data[0], 0x00);
    assert_eq!(frame.data[1], 0x3D);
}

#[test]
fn test_lane_keep_state_departure_alert() {
    let synthesizer = integrated();
    let stock = lkas_state_stock().with(fields::LKAS_ALERT, 11);
    let command = Command::new()
        .with_active(true)
        .with_alert(VisualAlert::LaneDepartureLeft)
        .with_departure(true, true);

    let frame = synthesizer
        .synthesize(
            FrameId::LaneKeepStatus,
            &stock,
            &command,
            synthesizer.config().sequence(0),
        )
        .unwrap();

    let (_, values) = synthesizer.encoder().unpack(frame.can_id, &frame.data).unwrap();
    assert_eq!(values.get(fields::LKAS_ALERT), Some(12));
    assert_eq!(values.get(fields::KEEP_HANDS_ON_WHEEL), Some(0));
}

#[test]
fn test_lane_keep_state_inactive_keeps_stock_active_flag() {
    let synthesizer = integrated();
    let stock = lkas_state_stock().with(fields::LKAS_ACTIVE, 1);

    let frame = synthesizer
        .synthesize(
            FrameId::LaneKeepStatus,
            &stock,
            &Command::new().with_lines(false, false),
            synthesizer.config().sequence(0),
        )
        .unwrap();

    let (_, values) = synthesizer.encoder().unpack(frame.can_id, &frame.data).unwrap();
    assert_eq!(values.get(fields::LKAS_ACTIVE), Some(1));
    assert_eq!(values.get(fields::LKAS_DASH_ICON), Some(0));
    assert_eq!(values.get(fields::LEFT_LINE_VISIBLE), Some(0));
    assert_eq!(values.get(fields::RIGHT_LINE_VISIBLE), Some(0));
    // Stock tone survives while assist is off
    assert_eq!(values.get(fields::LKAS_ALERT), Some(27));
}

#[test]
fn test_missing_stock_field_is_rejected_by_encoder() {
    let synthesizer = integrated();
    let stock = FieldSnapshot::new().with(fields::LKAS_ALERT, 0);

    let result = synthesizer.synthesize(
        FrameId::LaneKeepStatus,
        &stock,
        &Command::new(),
        synthesizer.config().sequence(0),
    );
    assert!(matches!(result, Err(OverlayError::MissingField { .. })));
}

#[test]
fn test_unknown_stock_field_is_rejected_by_encoder() {
    let synthesizer = integrated();
    let stock = FieldSnapshot::new()
        .with(fields::LKAS_STATE_MSG, 3)
        .with("Cruise_Set_Speed", 60)
        .with("Not_In_Dbc", 1);

    let result = synthesizer.synthesize(
        FrameId::DashStatus,
        &stock,
        &Command::new(),
        synthesizer.config().sequence(0),
    );
    assert!(matches!(result, Err(OverlayError::UnknownField { .. })));
}

#[test]
fn test_diagnostic_overrides_reach_frames() {
    let config = SynthesizerConfig::new()
        .with_throttle_override(80)
        .with_brake_speed_override(0);
    let synthesizer = FrameSynthesizer::new(config, packer("subaru_global.dbc"));

    let throttle_stock = FieldSnapshot::new()
        .with(fields::THROTTLE_PEDAL, 5)
        .with("Engine_RPM", 800);
    let frame = synthesizer
        .synthesize(
            FrameId::Throttle,
            &throttle_stock,
            &Command::new(),
            synthesizer.config().sequence(0),
        )
        .unwrap();
    assert_eq!(frame.data[0], 80);

    let brake_stock = FieldSnapshot::new()
        .with(fields::SPEED, 50)
        .with("Brake_Pedal", 7);
    let frame = synthesizer
        .synthesize(
            FrameId::Brake,
            &brake_stock,
            &Command::new(),
            synthesizer.config().sequence(0),
        )
        .unwrap();
    assert_eq!(frame.data[0], 0);
    assert_eq!(frame.data[2], 7);
}

#[test]
fn test_synthesize_all_integrated() {
    let config = SynthesizerConfig::new().with_bus(1);
    let mut lenient = DbcPacker::new().with_missing_as_zero(true);
    lenient.add_dbc(&fixture("subaru_global.dbc")).unwrap();
    let synthesizer = FrameSynthesizer::new(config, lenient);

    let mut stock = HashMap::new();
    stock.insert(FrameId::LaneKeepStatus, lkas_state_stock());
    stock.insert(
        FrameId::DashStatus,
        FieldSnapshot::new().with(fields::LKAS_STATE_MSG, 3),
    );

    let results = synthesizer.synthesize_all(
        &stock,
        &Command::new().with_active(true).with_torque(50),
        synthesizer.config().sequence(4),
    );

    assert_eq!(results.len(), Generation::Integrated.frames().len());
    for (frame, result) in &results {
        let can_frame = result.as_ref().unwrap_or_else(|e| panic!("{}: {}", frame, e));
        assert_eq!(can_frame.bus, 1);
        assert_eq!(can_frame.dlc(), 8);
    }

    let dash = &results
        .iter()
        .find(|(frame, _)| *frame == FrameId::DashStatus)
        .unwrap()
        .1;
    assert_eq!(dash.as_ref().unwrap().data[0] & 0x07, 0);
}

#[test]
fn test_legacy_rejects_integrated_only_frames() {
    let synthesizer = legacy();
    let result = synthesizer.synthesize(
        FrameId::DistanceCancel,
        &FieldSnapshot::new(),
        &Command::new().with_cancel(true),
        synthesizer.config().sequence(0),
    );
    assert!(matches!(result, Err(OverlayError::UnsupportedFrame { .. })));
}
