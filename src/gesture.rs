//! Geometric gesture classification from a single hand's landmarks.
//!
//! All heuristics work in normalized image coordinates where `y` grows downward, so
//! "above" means a smaller `y`.

use crate::{
    constants::{FINGER_JOINTS, INDEX_TIP, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST},
    landmarks::{HandFrame, HandPose},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// The gestures the classifier recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    None,
    ThumbsUp,
    OpenHand,
    Pinch,
    Present,
}

impl std::str::FromStr for GestureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Self::None),
            "thumbs_up" | "thumbsup" => Ok(Self::ThumbsUp),
            "open_hand" | "openhand" => Ok(Self::OpenHand),
            "pinch" => Ok(Self::Pinch),
            "present" => Ok(Self::Present),
            other => Err(Error::InvalidInput(format!("Unknown gesture: {other}"))),
        }
    }
}

/// One gesture decision with its score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GestureVerdict {
    pub kind: GestureKind,
    pub detected: bool,
    /// Score in `[0,1]`
    pub confidence: f64,
    /// Score at or above which `detected` is set
    pub threshold: f64,
}

impl GestureVerdict {
    fn from_score(kind: GestureKind, confidence: f64, threshold: f64) -> Self {
        // weights like 0.4 + 0.15 + 0.15 land a hair off 0.7
        let detected = confidence + 1e-9 >= threshold;
        Self {
            kind,
            detected,
            confidence,
            threshold,
        }
    }

    fn binary(kind: GestureKind, detected: bool) -> Self {
        Self {
            kind,
            detected,
            confidence: if detected { 1.0 } else { 0.0 },
            threshold: 1.0,
        }
    }

    /// Verdict for "nothing recognised"
    #[must_use]
    pub fn none() -> Self {
        Self::binary(GestureKind::None, false)
    }
}

/// Every verdict evaluated for one hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GestureReport {
    pub thumbs_up: GestureVerdict,
    pub open_hand: GestureVerdict,
    pub pinch: GestureVerdict,
    pub present: GestureVerdict,
    /// Wrist to middle-finger base distance
    pub hand_span: f64,
    /// `hand_span` clears the configured minimum
    pub within_reach: bool,
}

impl GestureReport {
    /// Report for a frame without hands
    #[must_use]
    pub fn absent() -> Self {
        Self {
            thumbs_up: GestureVerdict::binary(GestureKind::ThumbsUp, false),
            open_hand: GestureVerdict::binary(GestureKind::OpenHand, false),
            pinch: GestureVerdict::binary(GestureKind::Pinch, false),
            present: GestureVerdict::binary(GestureKind::Present, false),
            hand_span: 0.0,
            within_reach: false,
        }
    }

    /// Verdict for a given kind
    #[must_use]
    pub fn verdict(&self, kind: GestureKind) -> GestureVerdict {
        match kind {
            GestureKind::ThumbsUp => self.thumbs_up,
            GestureKind::OpenHand => self.open_hand,
            GestureKind::Pinch => self.pinch,
            GestureKind::Present => self.present,
            GestureKind::None => GestureVerdict::none(),
        }
    }

    /// Strongest detected gesture other than `Present`, if any
    #[must_use]
    pub fn dominant(&self) -> GestureVerdict {
        [self.pinch, self.thumbs_up, self.open_hand]
            .into_iter()
            .filter(|v| v.detected)
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .unwrap_or_else(GestureVerdict::none)
    }
}

/// Thresholds for the geometric heuristics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Confidence needed for thumbs-up
    pub thumbs_up_threshold: f64,
    /// Contribution of the raised thumb
    pub thumb_weight: f64,
    /// Contribution of each curled finger
    pub curled_finger_weight: f64,
    /// Extra distance the thumb tip must reach past its IP joint
    pub thumb_extension_margin: f64,
    /// Thumb-index distance below which a pinch is detected
    pub pinch_threshold: f64,
    /// Minimum wrist to middle-base distance for a hand to count as "at the surface"
    pub min_hand_span: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            thumbs_up_threshold: DEFAULT_THUMBS_UP_THRESHOLD,
            thumb_weight: DEFAULT_THUMB_WEIGHT,
            curled_finger_weight: DEFAULT_CURLED_FINGER_WEIGHT,
            thumb_extension_margin: DEFAULT_THUMB_EXTENSION_MARGIN,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            min_hand_span: 0.0,
        }
    }
}

/// Stateless landmark classifier
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    #[must_use]
    pub const fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Evaluate every pose-based verdict for one hand
    #[must_use]
    pub fn classify(&self, pose: &HandPose) -> GestureReport {
        let hand_span = pose.span();
        GestureReport {
            thumbs_up: self.thumbs_up(pose),
            open_hand: self.open_hand(pose),
            pinch: self.pinch(pose),
            present: GestureVerdict::binary(GestureKind::Present, true),
            hand_span,
            within_reach: hand_span >= self.config.min_hand_span,
        }
    }

    /// Classify the primary hand of a frame, or report absence
    #[must_use]
    pub fn classify_frame(&self, frame: &HandFrame) -> GestureReport {
        frame
            .primary()
            .map_or_else(GestureReport::absent, |pose| self.classify(pose))
    }

    /// Classify every hand of a frame, in frame order
    #[must_use]
    pub fn classify_hands(&self, frame: &HandFrame) -> Vec<GestureReport> {
        frame.hands.iter().map(|pose| self.classify(pose)).collect()
    }

    /// Thumb raised (tip above IP above MCP) plus curled fingers, as a weighted score
    #[must_use]
    pub fn thumbs_up(&self, pose: &HandPose) -> GestureVerdict {
        let tip = pose.point(THUMB_TIP);
        let ip = pose.point(THUMB_IP);
        let mcp = pose.point(THUMB_MCP);
        let thumb_up = tip.y < ip.y && ip.y < mcp.y;

        let curled = FINGER_JOINTS
            .iter()
            .filter(|&&(tip_idx, pip_idx)| pose.point(tip_idx).y > pose.point(pip_idx).y)
            .count();

        let mut confidence = 0.0;
        if thumb_up {
            confidence += self.config.thumb_weight;
        }
        confidence += self.config.curled_finger_weight * curled as f64;

        GestureVerdict::from_score(
            GestureKind::ThumbsUp,
            confidence.min(1.0),
            self.config.thumbs_up_threshold,
        )
    }

    /// Every finger reaches further from the wrist than its intermediate joint
    #[must_use]
    pub fn open_hand(&self, pose: &HandPose) -> GestureVerdict {
        let wrist = pose.point(WRIST);
        let fingers_open = FINGER_JOINTS.iter().all(|&(tip_idx, pip_idx)| {
            pose.point(tip_idx).distance(&wrist) > pose.point(pip_idx).distance(&wrist)
        });
        let thumb_open = pose.point(THUMB_TIP).distance(&wrist)
            > pose.point(THUMB_IP).distance(&wrist) + self.config.thumb_extension_margin;

        GestureVerdict::binary(GestureKind::OpenHand, fingers_open && thumb_open)
    }

    /// Thumb tip close to index tip
    #[must_use]
    pub fn pinch(&self, pose: &HandPose) -> GestureVerdict {
        let distance = pose.point(THUMB_TIP).distance(&pose.point(INDEX_TIP));
        let threshold = self.config.pinch_threshold;
        let detected = distance < threshold;
        let confidence = if detected {
            (1.0 - distance / threshold).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self::pinch_verdict(detected, confidence)
    }

    fn pinch_verdict(detected: bool, confidence: f64) -> GestureVerdict {
        GestureVerdict {
            kind: GestureKind::Pinch,
            detected,
            confidence,
            threshold: 0.0,
        }
    }
}
