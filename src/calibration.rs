//! Four-point perspective calibration.
//!
//! Points are collected in click order (top-left, top-right, bottom-right, bottom-left).
//! The fourth point solves the homography onto the destination rectangle; a degenerate
//! quad discards the points and restarts collection.

use crate::{
    homography::{homography_from_4pt, DestinationRect, Homography},
    mapper::PixelPoint,
    store::CalibrationStore,
    Error,
};
use log::{info, warn};

/// Outcome of feeding one point to the calibration manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStatus {
    /// Point accepted; `collected` of 4 so far
    Collecting { collected: usize },
    /// Fourth point accepted and a homography derived
    Calibrated,
    /// Fourth point produced a degenerate quad; collection restarted from empty
    Degenerate,
    /// Point ignored because collection is complete (reset first)
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Collecting,
    Complete,
}

/// Accumulates correspondence points and owns the current homography
pub struct CalibrationManager {
    destination: DestinationRect,
    degeneracy_epsilon: f64,
    points: Vec<PixelPoint>,
    homography: Option<Homography>,
    phase: Phase,
    store: Option<CalibrationStore>,
    rejection_logged: bool,
}

impl CalibrationManager {
    /// In-memory manager with nothing persisted
    #[must_use]
    pub fn new(destination: DestinationRect, degeneracy_epsilon: f64) -> Self {
        Self {
            destination,
            degeneracy_epsilon,
            points: Vec::with_capacity(4),
            homography: None,
            phase: Phase::Collecting,
            store: None,
            rejection_logged: false,
        }
    }

    /// Manager backed by a store; loads a previous calibration if one exists
    #[must_use]
    pub fn with_store(
        destination: DestinationRect,
        degeneracy_epsilon: f64,
        store: CalibrationStore,
    ) -> Self {
        let mut manager = Self::new(destination, degeneracy_epsilon);
        if let Some(h) = store.load() {
            manager.homography = Some(h);
            manager.phase = Phase::Complete;
        }
        manager.store = Some(store);
        manager
    }

    /// Feed the next correspondence point
    pub fn add_point(&mut self, point: PixelPoint) -> CalibrationStatus {
        if self.phase == Phase::Complete || self.points.len() >= 4 {
            if !self.rejection_logged {
                warn!(
                    "Calibration already complete; ignoring point ({:.0}, {:.0}) until reset",
                    point.x, point.y
                );
                self.rejection_logged = true;
            }
            return CalibrationStatus::Rejected;
        }

        self.points.push(point);
        info!("Calibration point {}: ({:.0}, {:.0})", self.points.len(), point.x, point.y);

        if self.points.len() < 4 {
            return CalibrationStatus::Collecting {
                collected: self.points.len(),
            };
        }

        let src = [self.points[0], self.points[1], self.points[2], self.points[3]];
        match homography_from_4pt(&src, &self.destination.corners(), self.degeneracy_epsilon) {
            Ok(h) => {
                self.homography = Some(h);
                self.phase = Phase::Complete;
                self.rejection_logged = false;
                if let Some(store) = &self.store {
                    if let Err(e) = store.save(&h, &self.points) {
                        warn!("Failed to persist calibration: {e}");
                    }
                }
                info!("Calibration complete");
                CalibrationStatus::Calibrated
            }
            Err(Error::DegenerateCalibration(reason)) => {
                warn!("Calibration failed ({reason}); collect four points again");
                self.points.clear();
                CalibrationStatus::Degenerate
            }
            Err(e) => {
                warn!("Calibration failed ({e}); collect four points again");
                self.points.clear();
                CalibrationStatus::Degenerate
            }
        }
    }

    /// Start a fresh collection cycle; the current homography stays in use until replaced
    pub fn begin(&mut self) {
        self.points.clear();
        self.phase = Phase::Collecting;
        self.rejection_logged = false;
        info!("Calibration started");
    }

    /// Clear in-memory and persisted calibration; mapping falls back to camera coordinates
    pub fn reset(&mut self) {
        self.points.clear();
        self.homography = None;
        self.phase = Phase::Collecting;
        self.rejection_logged = false;
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                warn!("Failed to remove persisted calibration: {e}");
            }
        }
        info!("Calibration reset");
    }

    pub const fn is_calibrated(&self) -> bool {
        self.homography.is_some()
    }

    /// True while points are being accepted
    pub fn is_collecting(&self) -> bool {
        self.phase == Phase::Collecting
    }

    pub const fn current_homography(&self) -> Option<&Homography> {
        self.homography.as_ref()
    }

    /// Points collected in the current cycle
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    pub const fn destination(&self) -> DestinationRect {
        self.destination
    }
}
