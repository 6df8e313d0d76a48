//! Scenario configuration loading and parsing

use anyhow::{bail, Context, Result};
use can_overlay::{
    AlertPolicy, Command, DbcPacker, DiagnosticOverrides, FieldSnapshot, FrameId, Generation,
    SynthesizerConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from a scenario .toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub command: Command,
    #[serde(default)]
    pub diagnostics: DiagnosticOverrides,
    #[serde(default)]
    pub stock: Vec<StockConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleConfig {
    #[serde(default)]
    pub generation: Generation,
    #[serde(default)]
    pub dbc_files: Vec<PathBuf>,
    #[serde(default)]
    pub bus: u8,
    #[serde(default = "default_steer_step")]
    pub steer_step: NonZeroU64,
    #[serde(default)]
    pub alert_policy: AlertPolicy,
    /// Encode signals absent from a snapshot as 0
    #[serde(default)]
    pub missing_as_zero: bool,
}

fn default_steer_step() -> NonZeroU64 {
    NonZeroU64::MIN
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub start_tick: u64,
    /// Scheduler period, used only to timestamp the trace
    #[serde(default = "default_period")]
    pub period_ms: u64,
    /// Only emit these frames (default: every frame of the generation)
    #[serde(default)]
    pub frames: Option<Vec<FrameId>>,
}

fn default_ticks() -> u64 {
    1
}

fn default_period() -> u64 {
    10
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            start_tick: 0,
            period_ms: default_period(),
            frames: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

/// One stock snapshot, given as named fields, a raw payload, or both
///
/// A raw payload is unpacked through the DBC first; named fields then
/// override the decoded values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StockConfig {
    pub frame: FrameId,
    pub can_id: Option<u32>,
    /// Hex bytes, whitespace separated or contiguous ("00 3D ..." or "003D...")
    pub data: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, i64>,
}

impl AppConfig {
    /// Synthesizer configuration for this scenario
    pub fn synthesizer_config(&self) -> SynthesizerConfig {
        SynthesizerConfig {
            generation: self.vehicle.generation,
            bus: self.vehicle.bus,
            steer_step: self.vehicle.steer_step,
            alert_policy: self.vehicle.alert_policy,
            diagnostics: self.diagnostics,
        }
    }

    /// Frames to emit each tick, in catalogue order
    pub fn frames(&self) -> Vec<FrameId> {
        let all = self.vehicle.generation.frames();
        match &self.run.frames {
            Some(selected) => all.iter().copied().filter(|f| selected.contains(f)).collect(),
            None => all.to_vec(),
        }
    }

    /// Resolve the `[[stock]]` entries into snapshots
    pub fn stock_snapshots(&self, packer: &DbcPacker) -> Result<HashMap<FrameId, FieldSnapshot>> {
        let mut snapshots = HashMap::new();

        for entry in &self.stock {
            let mut snapshot = match (&entry.data, entry.can_id) {
                (Some(data), Some(can_id)) => {
                    let bytes = parse_hex(data)
                        .with_context(|| format!("Invalid stock payload for {}", entry.frame))?;
                    let (name, values) = packer
                        .unpack(can_id, &bytes)
                        .with_context(|| format!("Failed to unpack stock {}", entry.frame))?;
                    log::debug!("Stock {} unpacked as {}", entry.frame, name);
                    values
                }
                (Some(_), None) => bail!("Stock {} has a payload but no can_id", entry.frame),
                (None, _) => FieldSnapshot::new(),
            };

            for (name, value) in &entry.fields {
                snapshot.set(name.clone(), *value);
            }

            if snapshots.insert(entry.frame, snapshot).is_some() {
                log::warn!("Duplicate stock entry for {}, keeping the last one", entry.frame);
            }
        }

        Ok(snapshots)
    }
}

/// Parse hex bytes, ignoring whitespace
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_ascii() {
        bail!("Non-hex characters in {:?}", text);
    }
    if digits.len() % 2 != 0 {
        bail!("Odd number of hex digits in {:?}", text);
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("Invalid hex byte {:?}", &digits[i..i + 2]))
        })
        .collect()
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    // DBC paths are relative to the config file
    if let Some(base) = path.parent() {
        for dbc in &mut config.vehicle.dbc_files {
            if dbc.is_relative() {
                *dbc = base.join(&*dbc);
            }
        }
    }

    Ok(config)
}
