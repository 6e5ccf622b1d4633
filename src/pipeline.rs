//! Frame pipeline: one context object owning every stateful component.
//!
//! Each frame runs landmarks -> gestures -> target zone -> mapping -> interaction and
//! produces at most one click plus optional touch and calibration events. Control
//! commands (pointer clicks, keys) are queued and only applied at frame boundaries.

use crate::{
    calibration::{CalibrationManager, CalibrationStatus},
    config::Config,
    emitter::{EventSink, OutboundEvent},
    gesture::{GestureClassifier, GestureReport},
    interaction::{InteractionInput, InteractionSlot, TriggerStrategy},
    landmarks::HandFrame,
    locator::{TargetLocator, TargetZone},
    mapper::{CoordinateMapper, NormalizedPosition, PixelPoint},
    source::HandPoseSource,
    store::CalibrationStore,
    Error, Result,
};
use image::RgbImage;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Out-of-band control input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCommand {
    /// Begin a new calibration cycle
    StartCalibration,
    /// Next calibration corner, in camera pixels
    CalibrationPoint(PixelPoint),
    /// Forget the calibration, in memory and on disk
    ResetCalibration,
    /// Lock the target zone at a camera pixel
    LockTarget(PixelPoint),
    /// Release the target lock
    UnlockTarget,
    /// Clear dwell, tap and cooldown state
    ResetInteraction,
    /// Stop the run loop
    Quit,
}

/// Fixed-capacity FIFO of control commands
#[derive(Debug)]
pub struct CommandQueue {
    capacity: usize,
    queue: VecDeque<ControlCommand>,
}

impl CommandQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Enqueue; when full the new command is dropped and `false` returned
    pub fn push(&mut self, command: ControlCommand) -> bool {
        if self.queue.len() >= self.capacity {
            warn!("Command queue full ({}); dropping {command:?}", self.capacity);
            return false;
        }
        self.queue.push_back(command);
        true
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn drain(&mut self) -> Vec<ControlCommand> {
        self.queue.drain(..).collect()
    }
}

/// What one frame produced
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub gestures: GestureReport,
    /// Smoothed destination position of the interaction point
    pub position: Option<NormalizedPosition>,
    pub zone: Option<TargetZone>,
    /// Events in emission order
    pub events: Vec<OutboundEvent>,
    /// A quit command was applied at this frame boundary
    pub quit: bool,
}

/// Totals reported when a run ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub clicks: usize,
}

/// Owns calibration, target locator, classifier, mapper and interaction slot
pub struct InteractionPipeline {
    config: Config,
    calibration: CalibrationManager,
    locator: TargetLocator,
    classifier: GestureClassifier,
    mapper: CoordinateMapper,
    slot: InteractionSlot,
    commands: CommandQueue,
    calibrating: bool,
}

impl InteractionPipeline {
    /// Build every component from the configuration, loading persisted artifacts
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for invalid configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let destination = config.calibration.destination();
        let epsilon = config.calibration.degeneracy_epsilon;
        let calibration = match &config.calibration.artifact_path {
            Some(path) => {
                CalibrationManager::with_store(destination, epsilon, CalibrationStore::new(path))
            }
            None => CalibrationManager::new(destination, epsilon),
        };
        if calibration.is_calibrated() {
            info!("Using persisted calibration");
        } else {
            info!("No calibration; mapping falls back to camera coordinates");
        }

        let mapper = CoordinateMapper::new(
            destination,
            config.calibration.frame_width,
            config.calibration.frame_height,
            config.create_filter()?,
        );

        Ok(Self {
            calibration,
            locator: TargetLocator::from_config(config.locator.clone()),
            classifier: GestureClassifier::new(config.gestures),
            mapper,
            slot: InteractionSlot::new(&config.interaction),
            commands: CommandQueue::new(config.interaction.command_queue_capacity),
            calibrating: false,
            config,
        })
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn calibration(&self) -> &CalibrationManager {
        &self.calibration
    }

    pub const fn locator(&self) -> &TargetLocator {
        &self.locator
    }

    pub const fn slot(&self) -> &InteractionSlot {
        &self.slot
    }

    /// True between a calibration start and its completion
    pub const fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    /// Queue a command for the next frame boundary
    pub fn submit(&mut self, command: ControlCommand) -> bool {
        self.commands.push(command)
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    fn restart_tracking(&mut self) {
        self.slot.reset();
        self.mapper.reset();
    }

    fn apply_commands(&mut self, events: &mut Vec<OutboundEvent>) -> bool {
        let mut quit = false;
        for command in self.commands.drain() {
            debug!("Applying {command:?}");
            match command {
                ControlCommand::StartCalibration => {
                    self.calibration.begin();
                    self.calibrating = true;
                    self.restart_tracking();
                    events.push(OutboundEvent::CalibrationStart);
                }
                ControlCommand::CalibrationPoint(point) => {
                    if !self.calibrating && self.calibration.is_collecting() {
                        self.calibrating = true;
                        events.push(OutboundEvent::CalibrationStart);
                    }
                    match self.calibration.add_point(point) {
                        CalibrationStatus::Collecting { collected } => {
                            events.push(OutboundEvent::CalibrationNext { step: collected });
                        }
                        CalibrationStatus::Calibrated => {
                            self.calibrating = false;
                            self.restart_tracking();
                            events.push(OutboundEvent::CalibrationEnd);
                        }
                        CalibrationStatus::Degenerate => {
                            events.push(OutboundEvent::CalibrationStart);
                        }
                        CalibrationStatus::Rejected => {}
                    }
                }
                ControlCommand::ResetCalibration => {
                    self.calibration.reset();
                    self.calibrating = true;
                    self.restart_tracking();
                    events.push(OutboundEvent::CalibrationStart);
                }
                ControlCommand::LockTarget(point) => self.locator.lock(point),
                ControlCommand::UnlockTarget => self.locator.unlock(),
                ControlCommand::ResetInteraction => self.slot.reset(),
                ControlCommand::Quit => quit = true,
            }
        }
        quit
    }

    // First hand within reach that shows the trigger gesture, else the first within reach
    fn acting_hand(&self, reports: &[GestureReport]) -> Option<usize> {
        let interaction = &self.config.interaction;
        let triggering = |r: &GestureReport| match interaction.strategy {
            TriggerStrategy::Pinch => r.pinch.detected,
            _ => r.verdict(interaction.qualifying_gesture).detected,
        };
        reports
            .iter()
            .position(|r| r.within_reach && triggering(r))
            .or_else(|| reports.iter().position(|r| r.within_reach))
    }

    /// Run one frame; `image` feeds automatic target location when present
    pub fn process_frame(
        &mut self,
        frame: &HandFrame,
        image: Option<&RgbImage>,
        now: Duration,
    ) -> FrameOutcome {
        let mut events = Vec::new();
        let quit = self.apply_commands(&mut events);

        let hands = &self.config.hands;
        let frame = frame.prepared(hands.min_confidence, hands.max_hands, hands.invert);
        let reports = self.classifier.classify_hands(&frame);
        let acting = self.acting_hand(&reports);
        let gestures = acting
            .or_else(|| (!reports.is_empty()).then_some(0))
            .map_or_else(GestureReport::absent, |i| reports[i]);
        let zone = self.locator.update(image, now).copied();

        let mut input = InteractionInput::absent(now, zone);
        let mut position = None;

        match acting.and_then(|i| frame.hands.get(i)) {
            Some(pose) => {
                let point = self.mapper.locate(pose, self.config.mapping.interaction_point);
                let Some(mapped) = self.mapper.map(point, self.calibration.current_homography())
                else {
                    debug!("Interaction point maps to infinity; frame skipped");
                    self.mapper.reset();
                    return FrameOutcome {
                        gestures,
                        position,
                        zone,
                        events,
                        quit,
                    };
                };
                position = Some(mapped);
                input.present = true;
                let qualifying = self.config.interaction.qualifying_gesture;
                input.qualifies = gestures.verdict(qualifying).detected;
                input.pinch = gestures.pinch.detected;
                input.position = position;
                input.camera_point = Some(point);
            }
            None if frame.is_present() => {
                debug!("Hand span {:.3} below minimum; ignored", gestures.hand_span);
                self.mapper.reset();
            }
            None => self.mapper.reset(),
        }

        if !self.calibrating {
            if let (true, Some(p)) = (self.config.interaction.emit_touch, position) {
                events.push(OutboundEvent::touch(p, now));
            }
            if let Some(click) = self.slot.update(&input) {
                events.push(OutboundEvent::Click(click));
            }
        }

        FrameOutcome {
            gestures,
            position,
            zone,
            events,
            quit,
        }
    }

    /// Pull frames until the source ends or a quit command arrives
    ///
    /// # Errors
    ///
    /// Returns `FrameAcquisition` when the source fails; sink errors are logged and
    /// the run continues
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<RunSummary>
    where
        S: HandPoseSource + ?Sized,
        K: EventSink + ?Sized,
    {
        let mut summary = RunSummary::default();
        info!("Starting interaction loop");

        loop {
            let timed = match source.next_frame() {
                Ok(Some(timed)) => timed,
                Ok(None) => {
                    info!("Pose source exhausted");
                    break;
                }
                Err(e @ Error::FrameAcquisition(_)) => return Err(e),
                Err(e) => return Err(Error::FrameAcquisition(e.to_string())),
            };

            for command in &timed.commands {
                self.submit(*command);
            }

            let outcome = self.process_frame(&timed.hands, timed.image.as_ref(), timed.timestamp);
            summary.frames += 1;

            for event in &outcome.events {
                if event.as_click().is_some() {
                    summary.clicks += 1;
                }
                if let Err(e) = sink.emit(event) {
                    warn!("Failed to deliver {event:?}: {e}");
                }
            }

            if outcome.quit {
                info!("Quit requested");
                break;
            }
        }

        if let Err(e) = sink.flush() {
            warn!("Failed to flush event sink: {e}");
        }
        info!("Processed {} frames, {} clicks", summary.frames, summary.clicks);
        Ok(summary)
    }
}
