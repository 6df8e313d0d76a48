//! Frame trace output (TXT and JSON lines)

use crate::config::OutputFormat;
use anyhow::Result;
use can_overlay::{CanFrame, FrameId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;

/// One synthesized frame in the trace
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord {
    pub tick: u64,
    pub timestamp: String,
    pub frame: FrameId,
    pub message: String,
    pub can_id: u32,
    pub bus: u8,
    pub data: String,
}

impl TraceRecord {
    pub fn new(
        tick: u64,
        timestamp: DateTime<Utc>,
        frame: FrameId,
        message: &str,
        can_frame: &CanFrame,
    ) -> Self {
        Self {
            tick,
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            frame,
            message: message.to_string(),
            can_id: can_frame.can_id,
            bus: can_frame.bus,
            data: hex(&can_frame.data),
        }
    }
}

/// Totals printed at the end of a text trace
#[derive(Debug, Default)]
pub struct TraceSummary {
    pub frames: usize,
    pub failures: usize,
}

/// Write one record in the chosen format
pub fn write_record(out: &mut dyn Write, format: OutputFormat, record: &TraceRecord) -> Result<()> {
    match format {
        OutputFormat::Txt => writeln!(
            out,
            "{} tick {:>6}  bus {}  0x{:03X}  {:<18} {}",
            record.timestamp, record.tick, record.bus, record.can_id, record.message, record.data
        )?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(record)?)?,
    }
    Ok(())
}

/// Write the closing summary (text format only)
pub fn write_summary(out: &mut dyn Write, format: OutputFormat, summary: &TraceSummary) -> Result<()> {
    if format == OutputFormat::Txt {
        writeln!(out, "───────────────────────────────────────────────")?;
        writeln!(
            out,
            "{} frames synthesized, {} failed",
            summary.frames, summary.failures
        )?;
    }
    Ok(())
}

fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
