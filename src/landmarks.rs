//! Hand-pose landmark data as produced by an external pose estimator.
//!
//! A [`HandFrame`] carries zero or more [`HandPose`]s for one camera frame. Each pose is
//! exactly [`NUM_HAND_LANDMARKS`] normalized points indexed by anatomy (0 = wrist,
//! 4/8/12/16/20 = fingertips). Frames are consumed and dropped once per pipeline step.

use crate::{
    constants::{MIDDLE_MCP, NUM_HAND_LANDMARKS, WRIST},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// One tracked anatomical point, normalized to `[0,1]` in image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position (0 = left edge)
    pub x: f64,
    /// Vertical position (0 = top edge)
    pub y: f64,
    /// Relative depth, unused by the geometric heuristics
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    /// Create a 2D landmark
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance in the image plane
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Which hand the estimator believes this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

/// A single detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHandPose")]
pub struct HandPose {
    landmarks: [Landmark; NUM_HAND_LANDMARKS],
    /// Handedness label reported by the estimator
    pub handedness: Handedness,
    /// Detection confidence in `[0,1]`
    pub confidence: f32,
}

#[derive(Deserialize)]
struct RawHandPose {
    landmarks: Vec<Landmark>,
    #[serde(default)]
    handedness: Handedness,
    #[serde(default = "full_confidence")]
    confidence: f32,
}

const fn full_confidence() -> f32 {
    1.0
}

impl TryFrom<RawHandPose> for HandPose {
    type Error = Error;

    fn try_from(raw: RawHandPose) -> Result<Self> {
        Self::from_slice(&raw.landmarks, raw.handedness, raw.confidence)
    }
}

impl HandPose {
    /// Build a pose from a fixed-size landmark array
    #[must_use]
    pub const fn new(
        landmarks: [Landmark; NUM_HAND_LANDMARKS],
        handedness: Handedness,
        confidence: f32,
    ) -> Self {
        Self {
            landmarks,
            handedness,
            confidence,
        }
    }

    /// Build a pose from a slice, rejecting anything but 21 points
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the slice length is wrong
    pub fn from_slice(
        points: &[Landmark],
        handedness: Handedness,
        confidence: f32,
    ) -> Result<Self> {
        let landmarks: [Landmark; NUM_HAND_LANDMARKS] = points.try_into().map_err(|_| {
            Error::InvalidInput(format!(
                "Hand pose needs {NUM_HAND_LANDMARKS} landmarks, got {}",
                points.len()
            ))
        })?;
        Ok(Self::new(landmarks, handedness, confidence))
    }

    /// Landmark by anatomical index
    ///
    /// # Panics
    ///
    /// Panics if `index >= 21`
    #[must_use]
    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    /// All landmarks in index order
    #[must_use]
    pub const fn landmarks(&self) -> &[Landmark; NUM_HAND_LANDMARKS] {
        &self.landmarks
    }

    /// Wrist to middle-finger base distance, a proxy for how close the hand is to the camera
    #[must_use]
    pub fn span(&self) -> f64 {
        self.point(WRIST).distance(&self.point(MIDDLE_MCP))
    }

    /// Apply a mirror/flip to every landmark
    #[must_use]
    pub fn inverted(&self, mode: InvertMode) -> Self {
        let mut out = self.clone();
        for lm in &mut out.landmarks {
            match mode {
                InvertMode::None => {}
                InvertMode::X => lm.x = 1.0 - lm.x,
                InvertMode::Y => lm.y = 1.0 - lm.y,
                InvertMode::XY => {
                    lm.x = 1.0 - lm.x;
                    lm.y = 1.0 - lm.y;
                }
            }
        }
        out
    }
}

/// Image inversion mode applied to landmarks before classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvertMode {
    /// No inversion
    None,
    /// Mirror horizontally (selfie view)
    #[default]
    X,
    /// Flip vertically
    Y,
    /// Both horizontal and vertical
    XY,
}

impl std::str::FromStr for InvertMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "xy" => Ok(Self::XY),
            other => Err(Error::InvalidInput(format!("Unknown invert mode: {other}"))),
        }
    }
}

/// All hands reported for one camera frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Detected hands, most confident first after [`HandFrame::prepared`]
    #[serde(default)]
    pub hands: Vec<HandPose>,
}

impl HandFrame {
    /// Frame with the given hands
    #[must_use]
    pub fn new(hands: Vec<HandPose>) -> Self {
        Self { hands }
    }

    /// Frame with no detections
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when at least one hand was reported
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.hands.is_empty()
    }

    /// Drop low-confidence hands, cap the count and apply the inversion
    #[must_use]
    pub fn prepared(&self, min_confidence: f32, max_hands: usize, invert: InvertMode) -> Self {
        let mut hands: Vec<HandPose> = self
            .hands
            .iter()
            .filter(|h| h.confidence >= min_confidence)
            .map(|h| h.inverted(invert))
            .collect();
        hands.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        hands.truncate(max_hands);
        Self { hands }
    }

    /// The hand that drives interaction, if any
    #[must_use]
    pub fn primary(&self) -> Option<&HandPose> {
        self.hands.first()
    }
}
