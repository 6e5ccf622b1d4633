//! Hand interaction library: turns hand-pose landmarks into debounced click events on a
//! calibrated surface.
//!
//! The pose estimator runs outside this crate and supplies 21 normalized landmarks per
//! hand. From there the pipeline does:
//! 1. Four-point perspective calibration from camera pixels onto a destination rectangle
//! 2. Optional target zone location (manual lock, brightest blob or color blob)
//! 3. Geometric gesture classification (thumbs-up, open hand, pinch, presence)
//! 4. Coordinate mapping through the homography with exponential smoothing
//! 5. A per-surface state machine that emits at most one click per trigger, gated by
//!    dwell, proximity, double-tap or pinch and a cooldown
//!
//! # Examples
//!
//! ## Calibrating a surface
//!
//! ```no_run
//! use hand_interaction::{
//!     calibration::{CalibrationManager, CalibrationStatus},
//!     homography::DestinationRect,
//!     mapper::PixelPoint,
//! };
//!
//! let mut calibration = CalibrationManager::new(DestinationRect::new(1920.0, 1080.0), 1e-3);
//! // corners clicked in order: top-left, top-right, bottom-right, bottom-left
//! for (x, y) in [(102.0, 80.0), (540.0, 92.0), (560.0, 400.0), (88.0, 410.0)] {
//!     if calibration.add_point(PixelPoint::new(x, y)) == CalibrationStatus::Calibrated {
//!         println!("Calibrated");
//!     }
//! }
//!
//! let h = calibration.current_homography().unwrap();
//! let surface = h.apply(PixelPoint::new(320.0, 240.0)).unwrap();
//! println!("Camera center lands at ({:.0}, {:.0})", surface.x, surface.y);
//! ```
//!
//! ## Classifying a hand
//!
//! ```no_run
//! use hand_interaction::{
//!     gesture::GestureClassifier,
//!     landmarks::{HandPose, Handedness, Landmark},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let points = vec![Landmark::new(0.5, 0.5); 21];
//! let pose = HandPose::from_slice(&points, Handedness::Right, 0.9)?;
//!
//! let classifier = GestureClassifier::default();
//! let report = classifier.classify(&pose);
//! println!("Thumbs up: {:.2}", report.thumbs_up.confidence);
//! println!("Pinch: {}", report.pinch.detected);
//! # Ok(())
//! # }
//! ```
//!
//! ## Complete Pipeline Example
//!
//! ```no_run
//! use hand_interaction::{
//!     config::Config,
//!     emitter::JsonLinesSink,
//!     pipeline::{ControlCommand, InteractionPipeline},
//!     source::ReplaySource,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("hand-interaction.yaml")?;
//! let mut pipeline = InteractionPipeline::new(config)?;
//!
//! // commands are applied at the next frame boundary
//! pipeline.submit(ControlCommand::StartCalibration);
//!
//! let mut source = ReplaySource::open("session.jsonl")?;
//! let mut sink = JsonLinesSink::new(std::io::stdout());
//! let summary = pipeline.run(&mut source, &mut sink)?;
//! println!("{} clicks in {} frames", summary.clicks, summary.frames);
//! # Ok(())
//! # }
//! ```

/// Hand landmark data types and frame preparation
pub mod landmarks;

/// Planar homography solve and projection
pub mod homography;

/// Four-point calibration state
pub mod calibration;

/// Persisted calibration and target lock artifacts
pub mod store;

/// Target zone detection and locking
pub mod locator;

/// Geometric gesture heuristics
pub mod gesture;

/// Position smoothing filters
pub mod filters;

/// Camera to destination coordinate mapping
pub mod mapper;

/// Trigger state machine and click events
pub mod interaction;

/// Per-frame pipeline and control commands
pub mod pipeline;

/// Hand-pose frame sources
pub mod source;

/// Outbound event sinks
pub mod emitter;

/// Utility functions for image processing
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
