//! Hand-pose sources.
//!
//! The pose estimator lives outside this crate; a source hands the pipeline one
//! [`TimedFrame`] at a time. The replay source reads JSON lines such as
//!
//! ```text
//! {"t": 0.033, "hands": [{"landmarks": [{"x": 0.5, "y": 0.8}, ...], "confidence": 0.9}]}
//! {"t": 0.066, "hands": [], "commands": [{"calibration_point": {"x": 102, "y": 80}}]}
//! {"t": 0.100, "hands": [], "image": "frames/0003.png"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Image paths are resolved
//! relative to the replay file.

use crate::{
    landmarks::{HandFrame, HandPose},
    pipeline::ControlCommand,
    Error, Result,
};
use image::RgbImage;
use log::debug;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One camera frame's landmarks with its timestamp
#[derive(Debug, Clone)]
pub struct TimedFrame {
    /// Time since the start of the run
    pub timestamp: Duration,
    pub hands: HandFrame,
    /// Camera image for automatic target location
    pub image: Option<RgbImage>,
    /// Commands to queue before this frame is processed
    pub commands: Vec<ControlCommand>,
}

impl TimedFrame {
    #[must_use]
    pub fn new(timestamp: Duration, hands: HandFrame) -> Self {
        Self {
            timestamp,
            hands,
            image: None,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: RgbImage) -> Self {
        self.image = Some(image);
        self
    }

    #[must_use]
    pub fn with_command(mut self, command: ControlCommand) -> Self {
        self.commands.push(command);
        self
    }
}

/// Producer of timestamped hand frames
pub trait HandPoseSource {
    /// Next frame, `Ok(None)` at end of stream
    ///
    /// # Errors
    ///
    /// Returns `FrameAcquisition` when the source cannot produce a frame
    fn next_frame(&mut self) -> Result<Option<TimedFrame>>;
}

/// In-memory frames, mostly for tests and benchmarks
#[derive(Debug, Default)]
pub struct FrameSequence {
    frames: VecDeque<TimedFrame>,
}

impl FrameSequence {
    #[must_use]
    pub fn new(frames: Vec<TimedFrame>) -> Self {
        Self { frames: frames.into() }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl HandPoseSource for FrameSequence {
    fn next_frame(&mut self) -> Result<Option<TimedFrame>> {
        Ok(self.frames.pop_front())
    }
}

#[derive(Deserialize)]
struct ReplayRecord {
    t: f64,
    #[serde(default)]
    hands: Vec<HandPose>,
    #[serde(default)]
    image: Option<PathBuf>,
    #[serde(default)]
    commands: Vec<ControlCommand>,
}

/// JSON-lines recording of hand frames
pub struct ReplaySource<R: BufRead> {
    reader: R,
    base_dir: Option<PathBuf>,
    line_no: usize,
}

impl<R: BufRead> ReplaySource<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            base_dir: None,
            line_no: 0,
        }
    }

    /// Directory against which relative image paths are resolved
    #[must_use]
    pub fn with_base_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    fn acquisition_error(&self, reason: impl std::fmt::Display) -> Error {
        Error::FrameAcquisition(format!("line {}: {reason}", self.line_no))
    }

    fn load_image(&self, path: &Path) -> Result<RgbImage> {
        let resolved = match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        image::open(&resolved)
            .map(|img| img.to_rgb8())
            .map_err(|e| self.acquisition_error(format!("{}: {e}", resolved.display())))
    }
}

impl ReplaySource<BufReader<File>> {
    /// Open a replay file
    ///
    /// # Errors
    ///
    /// Returns `FrameAcquisition` if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::FrameAcquisition(format!("Cannot open {}: {e}", path.display())))?;
        let source = Self::new(BufReader::new(file));
        Ok(match path.parent() {
            Some(dir) => source.with_base_dir(dir),
            None => source,
        })
    }
}

impl<R: BufRead> HandPoseSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<TimedFrame>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| Error::FrameAcquisition(e.to_string()))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let record: ReplayRecord =
                serde_json::from_str(trimmed).map_err(|e| self.acquisition_error(e))?;
            let timestamp = Duration::try_from_secs_f64(record.t)
                .map_err(|_| self.acquisition_error(format!("invalid timestamp {}", record.t)))?;
            let image = record.image.as_deref().map(|p| self.load_image(p)).transpose()?;

            debug!(
                "Replay line {}: {} hands at {:.3}s",
                self.line_no,
                record.hands.len(),
                record.t
            );
            return Ok(Some(TimedFrame {
                timestamp,
                hands: HandFrame::new(record.hands),
                image,
                commands: record.commands,
            }));
        }
    }
}
