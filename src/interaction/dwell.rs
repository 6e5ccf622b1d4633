//! Positional stability tracking for dwell triggers.

use crate::mapper::NormalizedPosition;
use std::time::Duration;

/// How long a position must stay put before it counts as a dwell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellThreshold {
    /// Elapsed time since the anchor was set
    Time(Duration),
    /// Consecutive stable samples after the anchor
    Frames(u32),
}

/// Anchor position, anchor timestamp and accumulated stability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellState {
    pub anchor: NormalizedPosition,
    pub since: Duration,
    pub elapsed: Duration,
    pub stable_frames: u32,
}

/// Result of feeding one sample to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellProgress {
    /// A fresh anchor was set (first sample or excursion beyond the radius)
    Anchored,
    /// Still within the radius; threshold not yet reached
    Stable,
    /// Within the radius for at least the threshold
    Complete,
}

/// Tracks how long a smoothed position stays within a radius of its anchor
#[derive(Debug, Clone)]
pub struct DwellTracker {
    radius: f64,
    threshold: DwellThreshold,
    state: Option<DwellState>,
}

impl DwellTracker {
    #[must_use]
    pub const fn new(radius: f64, threshold: DwellThreshold) -> Self {
        Self {
            radius,
            threshold,
            state: None,
        }
    }

    pub fn update(&mut self, position: NormalizedPosition, now: Duration) -> DwellProgress {
        let Some(state) = self.state.as_mut() else {
            self.anchor(position, now);
            return DwellProgress::Anchored;
        };

        if position.distance(&state.anchor) > self.radius {
            self.anchor(position, now);
            return DwellProgress::Anchored;
        }

        state.elapsed = now.saturating_sub(state.since);
        state.stable_frames += 1;

        let complete = match self.threshold {
            DwellThreshold::Time(t) => state.elapsed >= t,
            DwellThreshold::Frames(n) => state.stable_frames >= n,
        };
        if complete {
            DwellProgress::Complete
        } else {
            DwellProgress::Stable
        }
    }

    fn anchor(&mut self, position: NormalizedPosition, now: Duration) {
        self.state = Some(DwellState {
            anchor: position,
            since: now,
            elapsed: Duration::ZERO,
            stable_frames: 0,
        });
    }

    pub fn reset(&mut self) {
        self.state = None;
    }

    #[must_use]
    pub const fn state(&self) -> Option<&DwellState> {
        self.state.as_ref()
    }

    /// Fraction of the threshold accumulated so far, for feedback overlays
    #[must_use]
    pub fn progress(&self) -> f64 {
        let Some(state) = &self.state else {
            return 0.0;
        };
        let fraction = match self.threshold {
            DwellThreshold::Time(t) if t.is_zero() => 1.0,
            DwellThreshold::Time(t) => state.elapsed.as_secs_f64() / t.as_secs_f64(),
            DwellThreshold::Frames(0) => 1.0,
            DwellThreshold::Frames(n) => f64::from(state.stable_frames) / f64::from(n),
        };
        fraction.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_threshold() {
        let mut dwell = DwellTracker::new(0.03, DwellThreshold::Time(Duration::from_millis(400)));
        let p = NormalizedPosition::new(0.5, 0.5);
        assert_eq!(dwell.update(p, Duration::from_millis(0)), DwellProgress::Anchored);
        assert_eq!(dwell.update(p, Duration::from_millis(200)), DwellProgress::Stable);
        assert!((dwell.progress() - 0.5).abs() < 1e-9);
        assert_eq!(dwell.update(p, Duration::from_millis(400)), DwellProgress::Complete);
    }

    #[test]
    fn test_excursion_reanchors() {
        let mut dwell = DwellTracker::new(0.03, DwellThreshold::Frames(3));
        let p = NormalizedPosition::new(0.5, 0.5);
        dwell.update(p, Duration::ZERO);
        dwell.update(p, Duration::from_millis(33));
        assert_eq!(
            dwell.update(NormalizedPosition::new(0.6, 0.5), Duration::from_millis(66)),
            DwellProgress::Anchored
        );
        assert_eq!(dwell.state().unwrap().stable_frames, 0);
    }

    #[test]
    fn test_jitter_inside_radius_counts() {
        let mut dwell = DwellTracker::new(0.03, DwellThreshold::Frames(2));
        dwell.update(NormalizedPosition::new(0.5, 0.5), Duration::ZERO);
        dwell.update(NormalizedPosition::new(0.51, 0.5), Duration::from_millis(33));
        assert_eq!(
            dwell.update(NormalizedPosition::new(0.49, 0.51), Duration::from_millis(66)),
            DwellProgress::Complete
        );
    }
}
