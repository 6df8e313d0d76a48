//! Emit one tick of frames for both vehicle generations
//!
//! Usage:
//!   cargo run --example emit_frames [tick]

use can_overlay::frames::fields;
use can_overlay::{
    Command, DbcPacker, FieldSnapshot, FrameId, FrameSynthesizer, Generation, SynthesizerConfig,
    VisualAlert,
};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let tick: u64 = env::args().nth(1).map(|s| s.parse::<u64>()).transpose()?.unwrap_or(0);
    let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data");

    let command = Command::new()
        .with_active(true)
        .with_torque(-320)
        .with_lines(true, true)
        .with_alert(VisualAlert::LaneDepartureGeneric)
        .with_departure(false, true);

    let mut stock = HashMap::new();
    stock.insert(
        FrameId::LaneKeepStatus,
        FieldSnapshot::new()
            .with(fields::LKAS_ALERT, 12)
            .with(fields::KEEP_HANDS_ON_WHEEL, 1),
    );

    for (generation, dbc) in [
        (Generation::Integrated, "subaru_global.dbc"),
        (Generation::Legacy, "subaru_preglobal.dbc"),
    ] {
        let mut packer = DbcPacker::new().with_missing_as_zero(true);
        packer.add_dbc(&data_dir.join(dbc))?;

        let config = SynthesizerConfig::new().with_generation(generation);
        let synthesizer = FrameSynthesizer::new(config, packer);

        println!("=== {} (tick {}) ===", generation, tick);
        for (frame, result) in synthesizer.synthesize_all(&stock, &command, synthesizer.config().sequence(tick)) {
            match result {
                Ok(can_frame) => println!("  {:<18} {}", frame, can_frame),
                Err(e) => println!("  {:<18} error: {}", frame, e),
            }
        }
    }

    Ok(())
}
