//! Interaction state machine: turns per-frame hand observations into debounced clicks.
//!
//! One [`InteractionSlot`] runs per active interaction surface. Each frame it receives an
//! [`InteractionInput`] and emits at most one [`InteractionEvent`]. The trigger strategy
//! is fixed for the run:
//!
//! - `dwell`: the qualifying gesture holds within a radius for the dwell threshold
//! - `proximity`: the interaction point enters the active target zone
//! - `double_tap`: two hand appearances within the tap window
//! - `pinch`: the rising edge of a pinch
//!
//! Every strategy is gated by its own cooldown.

pub mod cooldown;
pub mod double_tap;
pub mod dwell;

pub use cooldown::Cooldown;
pub use double_tap::DoubleTapDetector;
pub use dwell::{DwellProgress, DwellState, DwellThreshold, DwellTracker};

use crate::{
    gesture::GestureKind,
    locator::TargetZone,
    mapper::{NormalizedPosition, PixelPoint},
    Error, Result,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How clicks are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStrategy {
    #[default]
    Dwell,
    Proximity,
    DoubleTap,
    Pinch,
}

impl std::str::FromStr for TriggerStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "dwell" => Ok(Self::Dwell),
            "proximity" | "zone" => Ok(Self::Proximity),
            "double_tap" | "doubletap" => Ok(Self::DoubleTap),
            "pinch" => Ok(Self::Pinch),
            other => Err(Error::InvalidInput(format!("Unknown trigger strategy: {other}"))),
        }
    }
}

/// Slot state between frames; a trigger is transient and lands back in `Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    Idle,
    Tracking,
    Dwelling,
}

/// A debounced click at a normalized destination position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub x: f64,
    pub y: f64,
    /// Seconds since the start of the run
    pub timestamp: f64,
    pub trigger: TriggerStrategy,
}

impl InteractionEvent {
    #[must_use]
    pub fn new(
        position: NormalizedPosition,
        timestamp: Duration,
        trigger: TriggerStrategy,
    ) -> Self {
        let p = position.clamped();
        Self {
            x: p.x,
            y: p.y,
            timestamp: timestamp.as_secs_f64(),
            trigger,
        }
    }
}

/// One frame's worth of observations for a slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionInput {
    pub timestamp: Duration,
    /// A hand is present and close enough to the surface
    pub present: bool,
    /// The configured qualifying gesture is detected
    pub qualifies: bool,
    /// Pinch verdict of the primary hand
    pub pinch: bool,
    /// Smoothed destination position of the interaction point
    pub position: Option<NormalizedPosition>,
    /// Interaction point in camera pixels
    pub camera_point: Option<PixelPoint>,
    pub zone: Option<TargetZone>,
}

impl InteractionInput {
    /// Input for a frame with no usable hand
    #[must_use]
    pub const fn absent(timestamp: Duration, zone: Option<TargetZone>) -> Self {
        Self {
            timestamp,
            present: false,
            qualifies: false,
            pinch: false,
            position: None,
            camera_point: None,
            zone,
        }
    }
}

/// Interaction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub strategy: TriggerStrategy,
    /// Gesture that arms dwell and proximity triggers
    pub qualifying_gesture: GestureKind,
    /// Stability radius in normalized destination units
    pub stability_radius: f64,
    /// Dwell threshold in seconds
    pub dwell_seconds: f64,
    /// Dwell threshold in stable frames; overrides `dwell_seconds` when set
    pub dwell_frames: Option<u32>,
    /// Cooldown after a dwell click, seconds
    pub dwell_cooldown: f64,
    /// Cooldown after a pinch click, seconds
    pub pinch_cooldown: f64,
    /// Cooldown after a proximity click, seconds
    pub proximity_cooldown: f64,
    /// Maximum gap between two taps, seconds
    pub tap_window: f64,
    /// Cooldown after a double-tap click, seconds
    pub tap_cooldown: f64,
    /// Emit a continuous touch event for every tracked frame
    pub emit_touch: bool,
    /// Capacity of the control command queue
    pub command_queue_capacity: usize,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            strategy: TriggerStrategy::Dwell,
            qualifying_gesture: GestureKind::OpenHand,
            stability_radius: DEFAULT_STABILITY_RADIUS,
            dwell_seconds: DEFAULT_DWELL_SECONDS,
            dwell_frames: None,
            dwell_cooldown: DEFAULT_DWELL_COOLDOWN,
            pinch_cooldown: DEFAULT_PINCH_COOLDOWN,
            proximity_cooldown: DEFAULT_PROXIMITY_COOLDOWN,
            tap_window: DEFAULT_TAP_WINDOW,
            tap_cooldown: DEFAULT_TAP_COOLDOWN,
            emit_touch: false,
            command_queue_capacity: DEFAULT_COMMAND_QUEUE_CAPACITY,
        }
    }
}

impl InteractionConfig {
    #[must_use]
    pub fn dwell_threshold(&self) -> DwellThreshold {
        match self.dwell_frames {
            Some(n) => DwellThreshold::Frames(n),
            None => DwellThreshold::Time(seconds(self.dwell_seconds)),
        }
    }

    /// Cooldown belonging to the configured strategy
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        seconds(match self.strategy {
            TriggerStrategy::Dwell => self.dwell_cooldown,
            TriggerStrategy::Proximity => self.proximity_cooldown,
            TriggerStrategy::DoubleTap => self.tap_cooldown,
            TriggerStrategy::Pinch => self.pinch_cooldown,
        })
    }
}

// Negative or NaN values collapse to zero; config validation reports them first
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// Per-surface trigger state
pub struct InteractionSlot {
    strategy: TriggerStrategy,
    state: InteractionState,
    dwell: DwellTracker,
    cooldown: Cooldown,
    taps: DoubleTapDetector,
    pinch_latched: bool,
    last_position: Option<NormalizedPosition>,
}

impl InteractionSlot {
    #[must_use]
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            strategy: config.strategy,
            state: InteractionState::Idle,
            dwell: DwellTracker::new(config.stability_radius, config.dwell_threshold()),
            cooldown: Cooldown::new(config.cooldown()),
            taps: DoubleTapDetector::new(seconds(config.tap_window)),
            pinch_latched: false,
            last_position: None,
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> TriggerStrategy {
        self.strategy
    }

    #[must_use]
    pub const fn state(&self) -> InteractionState {
        self.state
    }

    /// Dwell anchor and timer, while one is running
    #[must_use]
    pub const fn dwell(&self) -> Option<&DwellState> {
        self.dwell.state()
    }

    /// Dwell completion in `[0,1]`
    #[must_use]
    pub fn dwell_progress(&self) -> f64 {
        self.dwell.progress()
    }

    /// Clear dwell, tap and pinch history along with the cooldown timestamp
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.dwell.reset();
        self.cooldown.reset();
        self.taps.reset();
        self.pinch_latched = false;
        self.last_position = None;
        debug!("Interaction slot reset");
    }

    /// Advance one frame; returns a click when a trigger fires
    pub fn update(&mut self, input: &InteractionInput) -> Option<InteractionEvent> {
        if input.position.is_some() {
            self.last_position = input.position;
        }

        let fired = match self.strategy {
            TriggerStrategy::Dwell => self.update_dwell(input),
            TriggerStrategy::Proximity => self.update_proximity(input),
            TriggerStrategy::DoubleTap => self.update_double_tap(input),
            TriggerStrategy::Pinch => self.update_pinch(input),
        }?;

        self.cooldown.record(input.timestamp);
        let event = InteractionEvent::new(fired, input.timestamp, self.strategy);
        info!(
            "Click ({:?}) at ({:.3}, {:.3}) t={:.3}s",
            self.strategy, event.x, event.y, event.timestamp
        );
        Some(event)
    }

    fn update_dwell(&mut self, input: &InteractionInput) -> Option<NormalizedPosition> {
        let position = match input.position {
            Some(p) if input.present && input.qualifies => p,
            _ => {
                self.state = InteractionState::Idle;
                self.dwell.reset();
                return None;
            }
        };

        match self.dwell.update(position, input.timestamp) {
            DwellProgress::Anchored => {
                self.state = InteractionState::Tracking;
                None
            }
            DwellProgress::Stable => {
                self.state = InteractionState::Dwelling;
                None
            }
            DwellProgress::Complete if self.cooldown.ready(input.timestamp) => {
                self.state = InteractionState::Idle;
                self.dwell.reset();
                Some(position)
            }
            DwellProgress::Complete => {
                // held through the cooldown; fires as soon as it expires
                self.state = InteractionState::Dwelling;
                None
            }
        }
    }

    fn update_proximity(&mut self, input: &InteractionInput) -> Option<NormalizedPosition> {
        let (Some(position), Some(point)) = (input.position, input.camera_point) else {
            self.state = InteractionState::Idle;
            return None;
        };
        if !(input.present && input.qualifies) {
            self.state = InteractionState::Idle;
            return None;
        }

        self.state = InteractionState::Tracking;
        let inside = input.zone.is_some_and(|zone| zone.contains(point));
        if inside && self.cooldown.ready(input.timestamp) {
            self.state = InteractionState::Idle;
            return Some(position);
        }
        None
    }

    fn update_double_tap(&mut self, input: &InteractionInput) -> Option<NormalizedPosition> {
        self.state = if input.present {
            InteractionState::Tracking
        } else {
            InteractionState::Idle
        };

        if !self.taps.update(input.present, input.timestamp) {
            return None;
        }
        if !self.cooldown.ready(input.timestamp) {
            debug!("Double tap inside cooldown; ignored");
            return None;
        }
        self.state = InteractionState::Idle;
        Some(
            input
                .position
                .or(self.last_position)
                .unwrap_or(NormalizedPosition::new(0.5, 0.5)),
        )
    }

    fn update_pinch(&mut self, input: &InteractionInput) -> Option<NormalizedPosition> {
        self.state = if input.present {
            InteractionState::Tracking
        } else {
            InteractionState::Idle
        };

        if !(input.present && input.pinch) {
            self.pinch_latched = false;
            return None;
        }
        if self.pinch_latched || !self.cooldown.ready(input.timestamp) {
            return None;
        }

        let position = input.position.or(self.last_position)?;
        self.pinch_latched = true;
        self.state = InteractionState::Idle;
        Some(position)
    }
}
