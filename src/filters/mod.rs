//! Smoothing filters for the tracked interaction point.
//!
//! The mapper runs every projected position through a [`PositionFilter`] so that
//! landmark jitter does not break dwell stability.

/// Exponential smoothing weighted toward the previous output
pub mod exponential;

use crate::{Error, Result};

/// Trait for all position filters
pub trait PositionFilter: Send + Sync {
    /// Apply filter to a new raw sample
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64);

    /// Reset filter state; the next sample seeds the filter
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl PositionFilter for NoFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a position filter from a `name[:param]` spec, e.g. `exponential:0.7`
pub fn create_filter(spec: &str) -> Result<Box<dyn PositionFilter>> {
    let spec = spec.trim().to_lowercase();
    let mut parts = spec.split(':');
    let name = parts.next().unwrap_or_default();
    let param = parts.next();

    if parts.next().is_some() {
        return Err(Error::FilterError(format!("Too many parameters in filter spec: {spec}")));
    }

    match name {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" | "ema" => {
            let alpha = match param {
                Some(p) => p
                    .parse::<f64>()
                    .map_err(|_| Error::FilterError(format!("Alpha is not a number: {p}")))?,
                None => crate::constants::DEFAULT_SMOOTHING_ALPHA,
            };
            if !(0.0..1.0).contains(&alpha) {
                return Err(Error::FilterError(format!("Alpha must be in [0, 1), got {alpha}")));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(alpha)))
        }
        _ => Err(Error::FilterError(format!("Unknown filter type: {name}"))),
    }
}
