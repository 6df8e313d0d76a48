//! Main synthesizer API
//!
//! `FrameSynthesizer` is the entry point for building outgoing frames. Each
//! call is a pure transform of (stock snapshot, command, tick) into one
//! frame; nothing is retained between calls.

use crate::checksum;
use crate::command::Command;
use crate::config::SynthesizerConfig;
use crate::frames::FrameId;
use crate::overlay::{self, OverlayFlags};
use crate::packer::FrameEncoder;
use crate::sequencer::SequenceState;
use crate::types::{CanFrame, FieldSnapshot, OverlayError, Result};
use std::collections::HashMap;

/// Source of the latest decoded stock snapshot per frame
pub trait StockSnapshots {
    /// Latest stock values for `frame`, if any were observed
    fn latest(&self, frame: FrameId) -> Option<&FieldSnapshot>;
}

impl StockSnapshots for HashMap<FrameId, FieldSnapshot> {
    fn latest(&self, frame: FrameId) -> Option<&FieldSnapshot> {
        self.get(&frame)
    }
}

/// Builds outgoing frames for one vehicle generation
pub struct FrameSynthesizer<E> {
    config: SynthesizerConfig,
    encoder: E,
}

impl<E: FrameEncoder> FrameSynthesizer<E> {
    /// Create a synthesizer that encodes through `encoder`
    pub fn new(config: SynthesizerConfig, encoder: E) -> Self {
        Self { config, encoder }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Synthesize one frame
    ///
    /// Runs the overlay rule, writes the rolling counter, seals the
    /// checksum over a provisional encode when the layout has one, and
    /// returns the final encode.
    ///
    /// # Example
    /// ```no_run
    /// use can_overlay::{Command, DbcPacker, FieldSnapshot, FrameId, FrameSynthesizer, SynthesizerConfig};
    /// use std::path::Path;
    ///
    /// let mut packer = DbcPacker::new();
    /// packer.add_dbc(Path::new("subaru_global.dbc")).unwrap();
    ///
    /// let config = SynthesizerConfig::new();
    /// let synthesizer = FrameSynthesizer::new(config.clone(), packer);
    /// let command = Command::new().with_active(true).with_torque(120);
    ///
    /// let frame = synthesizer
    ///     .synthesize(FrameId::SteeringCommand, &FieldSnapshot::new(), &command, config.sequence(42))
    ///     .unwrap();
    /// println!("{}", frame);
    /// ```
    pub fn synthesize(
        &self,
        frame: FrameId,
        stock: &FieldSnapshot,
        command: &Command,
        sequence: SequenceState,
    ) -> Result<CanFrame> {
        let generation = self.config.generation;
        let layout = generation
            .layout(frame)
            .ok_or_else(|| OverlayError::UnsupportedFrame {
                frame: frame.to_string(),
                generation: generation.to_string(),
            })?;

        let flags = OverlayFlags {
            alert_policy: self.config.alert_policy,
            diagnostics: self.config.diagnostics,
        };
        let mut values = overlay::apply(
            frame,
            &generation.steering_fields(),
            stock,
            command,
            &flags,
        );

        let mut counter = None;
        if let Some(field) = layout.counter {
            let value = sequence.counter(field.width);
            values.set(field.name, value as i64);
            counter = Some(value);
        }

        let mut sum = None;
        if let Some(field) = layout.checksum {
            sum = Some(checksum::seal_checksum(
                &self.encoder,
                layout.message,
                self.config.bus,
                field,
                &mut values,
            )?);
        }

        let encoded = self.encoder.encode(layout.message, self.config.bus, &values)?;

        log::debug!(
            "{} tick {}: {} counter={:?} checksum={:?}",
            layout.message,
            sequence.tick,
            encoded,
            counter,
            sum
        );

        Ok(encoded)
    }

    /// Synthesize every frame the generation carries, in catalogue order
    ///
    /// Frames with no observed stock snapshot start from an empty one.
    pub fn synthesize_all<S: StockSnapshots + ?Sized>(
        &self,
        stock: &S,
        command: &Command,
        sequence: SequenceState,
    ) -> Vec<(FrameId, Result<CanFrame>)> {
        let empty = FieldSnapshot::new();

        self.config
            .generation
            .frames()
            .iter()
            .map(|&frame| {
                let snapshot = stock.latest(frame).unwrap_or(&empty);
                (frame, self.synthesize(frame, snapshot, command, sequence))
            })
            .collect()
    }
}
