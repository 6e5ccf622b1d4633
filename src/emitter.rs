//! Outbound event delivery.
//!
//! Every event is one JSON object tagged by `event`, e.g.
//! `{"event":"click","x":0.5,"y":0.5,"timestamp":1.2,"trigger":"dwell"}`.

use crate::{interaction::InteractionEvent, mapper::NormalizedPosition, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

/// Everything the pipeline can send to a consumer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Debounced trigger
    Click(InteractionEvent),
    /// Smoothed position of a tracked hand
    Touch { x: f64, y: f64, timestamp: f64 },
    /// A calibration cycle began; the next point is the top-left corner
    CalibrationStart,
    /// `step` points of 4 collected
    CalibrationNext { step: usize },
    /// Four points accepted and a homography derived
    CalibrationEnd,
}

impl OutboundEvent {
    #[must_use]
    pub fn touch(position: NormalizedPosition, timestamp: Duration) -> Self {
        let p = position.clamped();
        Self::Touch {
            x: p.x,
            y: p.y,
            timestamp: timestamp.as_secs_f64(),
        }
    }

    /// The click payload, if this is a click
    #[must_use]
    pub const fn as_click(&self) -> Option<&InteractionEvent> {
        match self {
            Self::Click(e) => Some(e),
            _ => None,
        }
    }
}

/// Consumer of outbound events
pub trait EventSink {
    /// Deliver one event
    fn emit(&mut self, event: &OutboundEvent) -> Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &OutboundEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<OutboundEvent>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the clicks, in emission order
    #[must_use]
    pub fn clicks(&self) -> Vec<InteractionEvent> {
        self.events.iter().filter_map(|e| e.as_click().copied()).collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &OutboundEvent) -> Result<()> {
        self.events.push(*event);
        Ok(())
    }
}
