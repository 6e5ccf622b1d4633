//! Coordinate mapping from camera pixels to normalized target-surface positions.
//!
//! Calibrated points go through the homography and are divided by the destination
//! rectangle; uncalibrated points fall back to camera-normalized coordinates. Either
//! way the result is smoothed by the configured [`PositionFilter`].

use crate::{
    constants::{INDEX_TIP, MIDDLE_MCP, WRIST},
    filters::PositionFilter,
    homography::{DestinationRect, Homography},
    landmarks::HandPose,
    Error, Result,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// A pixel coordinate in source-camera (or destination) space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A position normalized to the unit square of the target surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Clamp both axes into `[0, 1]`
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

/// Landmark that drives the tracked position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionPoint {
    #[default]
    IndexTip,
    MiddleBase,
    Wrist,
}

impl InteractionPoint {
    #[must_use]
    pub const fn landmark(self) -> usize {
        match self {
            Self::IndexTip => INDEX_TIP,
            Self::MiddleBase => MIDDLE_MCP,
            Self::Wrist => WRIST,
        }
    }
}

impl std::str::FromStr for InteractionPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "index_tip" | "index" => Ok(Self::IndexTip),
            "middle_base" | "palm" => Ok(Self::MiddleBase),
            "wrist" => Ok(Self::Wrist),
            other => Err(Error::InvalidInput(format!("Unknown interaction point: {other}"))),
        }
    }
}

/// Projects and smooths the tracked interaction point
pub struct CoordinateMapper {
    destination: DestinationRect,
    frame_width: f64,
    frame_height: f64,
    filter: Box<dyn PositionFilter>,
}

impl CoordinateMapper {
    /// Create a mapper for the given destination rectangle and camera frame size
    pub fn new(
        destination: DestinationRect,
        frame_width: f64,
        frame_height: f64,
        filter: Box<dyn PositionFilter>,
    ) -> Self {
        Self {
            destination,
            frame_width,
            frame_height,
            filter,
        }
    }

    /// Camera frame size used for the uncalibrated fallback and landmark scaling
    pub const fn frame_size(&self) -> (f64, f64) {
        (self.frame_width, self.frame_height)
    }

    /// Convert a normalized landmark into a camera pixel
    pub fn to_pixel(&self, x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x * self.frame_width, y * self.frame_height)
    }

    /// Camera pixel of the chosen landmark
    pub fn locate(&self, pose: &HandPose, point: InteractionPoint) -> PixelPoint {
        let lm = pose.point(point.landmark());
        self.to_pixel(lm.x, lm.y)
    }

    /// Project without smoothing
    pub fn project(
        &self,
        point: PixelPoint,
        homography: Option<&Homography>,
    ) -> Option<NormalizedPosition> {
        match homography {
            Some(h) => {
                let p = h.apply(point)?;
                Some(NormalizedPosition::new(
                    p.x / self.destination.width,
                    p.y / self.destination.height,
                ))
            }
            None => Some(NormalizedPosition::new(
                point.x / self.frame_width,
                point.y / self.frame_height,
            )),
        }
    }

    /// Project and smooth; the first sample after a reset seeds the filter
    ///
    /// `None` when the homography sends the point to infinity; the filter is left untouched.
    pub fn map(
        &mut self,
        point: PixelPoint,
        homography: Option<&Homography>,
    ) -> Option<NormalizedPosition> {
        let raw = self.project(point, homography)?;
        let (x, y) = self.filter.apply(raw.x, raw.y);
        debug!(
            "Mapped ({:.1}, {:.1}) -> raw ({:.3}, {:.3}) smoothed ({x:.3}, {y:.3})",
            point.x, point.y, raw.x, raw.y
        );
        Some(NormalizedPosition::new(x, y))
    }

    /// Drop smoothing history (e.g. after recalibration)
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}
