//! Target zone location: a fixed circular hotspot in camera pixel space.
//!
//! The zone is either locked manually (pointer click, persisted across runs) or found
//! automatically on a time-boxed re-scan cadence, from the brightest blob or from a
//! color-masked blob. A manual lock always wins over automatic scans until unlocked.

use crate::{
    mapper::PixelPoint,
    store::TargetLockStore,
    utils::image_conversion::{blurred_luma, hsv_mask, largest_region, open, threshold},
    Error, Result,
};
use image::RgbImage;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// How a zone came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    AutoDetected,
    ManualLock,
}

/// Circular interaction hotspot in camera pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetZone {
    pub center: PixelPoint,
    pub radius: f64,
    pub source: ZoneSource,
}

impl TargetZone {
    /// True if `point` lies strictly inside the zone
    #[must_use]
    pub fn contains(&self, point: PixelPoint) -> bool {
        self.center.distance(&point) < self.radius
    }
}

/// Detection strategy; one per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    /// Center comes from a pointer click
    #[default]
    Manual,
    /// Centroid of the largest very bright region
    BrightnessPeak,
    /// Enclosing circle of the largest region inside an HSV range
    ColorMask,
}

impl std::str::FromStr for LocatorStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "brightness" | "brightness_peak" => Ok(Self::BrightnessPeak),
            "color" | "color_mask" => Ok(Self::ColorMask),
            other => Err(Error::InvalidInput(format!("Unknown locator strategy: {other}"))),
        }
    }
}

/// Target locator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub strategy: LocatorStrategy,
    /// Radius given to manual and brightness zones
    pub manual_radius: f64,
    /// Luminance cutoff for the brightness strategy
    pub brightness_threshold: u8,
    /// Gaussian blur sigma before thresholding
    pub blur_sigma: f32,
    /// Minimum bright-region area in pixels
    pub min_area: usize,
    /// Lower HSV bound (H 0..180, S/V 0..255)
    pub hsv_lower: [u8; 3],
    /// Upper HSV bound
    pub hsv_upper: [u8; 3],
    /// Plausible enclosing-circle radius range for the color strategy
    pub min_radius: f64,
    pub max_radius: f64,
    /// Seconds between automatic re-scans
    pub rescan_interval: f64,
    /// Where a manual lock is persisted; `None` keeps it in memory only
    pub lock_path: Option<PathBuf>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            strategy: LocatorStrategy::Manual,
            manual_radius: DEFAULT_MANUAL_RADIUS,
            brightness_threshold: DEFAULT_BRIGHTNESS_THRESHOLD,
            blur_sigma: DEFAULT_BLUR_SIGMA,
            min_area: DEFAULT_MIN_REGION_AREA,
            hsv_lower: [35, 80, 80],
            hsv_upper: [85, 255, 255],
            min_radius: DEFAULT_MIN_TARGET_RADIUS,
            max_radius: DEFAULT_MAX_TARGET_RADIUS,
            rescan_interval: DEFAULT_RESCAN_SECONDS,
            lock_path: None,
        }
    }
}

/// Owns the active target zone and its re-scan schedule
pub struct TargetLocator {
    config: LocatorConfig,
    zone: Option<TargetZone>,
    last_scan: Option<Duration>,
    store: Option<TargetLockStore>,
}

impl TargetLocator {
    #[must_use]
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            config,
            zone: None,
            last_scan: None,
            store: None,
        }
    }

    /// Locator backed by the configured lock path, if any
    #[must_use]
    pub fn from_config(config: LocatorConfig) -> Self {
        match config.lock_path.clone() {
            Some(path) => Self::with_store(config, TargetLockStore::new(path)),
            None => Self::new(config),
        }
    }

    /// Locator backed by a lock store; restores a persisted lock
    #[must_use]
    pub fn with_store(config: LocatorConfig, store: TargetLockStore) -> Self {
        let mut locator = Self::new(config);
        if let Some(center) = store.load() {
            info!("Target lock loaded at ({:.0}, {:.0})", center.x, center.y);
            locator.zone = Some(locator.manual_zone(center));
        }
        locator.store = Some(store);
        locator
    }

    pub const fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Active zone, if any
    pub const fn current(&self) -> Option<&TargetZone> {
        self.zone.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.zone, Some(TargetZone { source: ZoneSource::ManualLock, .. }))
    }

    fn manual_zone(&self, center: PixelPoint) -> TargetZone {
        TargetZone {
            center,
            radius: self.config.manual_radius,
            source: ZoneSource::ManualLock,
        }
    }

    /// Lock the zone at a pointer position and persist it
    pub fn lock(&mut self, center: PixelPoint) {
        self.zone = Some(self.manual_zone(center));
        if let Some(store) = &self.store {
            if let Err(e) = store.save(center) {
                warn!("Failed to persist target lock: {e}");
            }
        }
        info!("Target locked at ({:.0}, {:.0})", center.x, center.y);
    }

    /// Release a manual lock; automatic strategies re-scan on the next update
    pub fn unlock(&mut self) {
        if self.is_locked() {
            self.zone = None;
        }
        self.last_scan = None;
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                warn!("Failed to remove persisted target lock: {e}");
            }
        }
        info!("Target unlocked");
    }

    /// Run the configured detector on one frame without touching state
    #[must_use]
    pub fn locate(&self, frame: &RgbImage) -> Option<TargetZone> {
        match self.config.strategy {
            LocatorStrategy::Manual => self.zone.filter(|z| z.source == ZoneSource::ManualLock),
            LocatorStrategy::BrightnessPeak => self.locate_brightness(frame),
            LocatorStrategy::ColorMask => self.locate_color(frame),
        }
    }

    fn locate_brightness(&self, frame: &RgbImage) -> Option<TargetZone> {
        let gray = blurred_luma(frame, self.config.blur_sigma);
        let mask = threshold(&gray, self.config.brightness_threshold);
        let region = largest_region(&mask)?;
        if region.area() < self.config.min_area {
            debug!("Brightest region too small: {} px", region.area());
            return None;
        }
        Some(TargetZone {
            center: region.centroid(),
            radius: self.config.manual_radius,
            source: ZoneSource::AutoDetected,
        })
    }

    fn locate_color(&self, frame: &RgbImage) -> Option<TargetZone> {
        let mask = open(&hsv_mask(frame, self.config.hsv_lower, self.config.hsv_upper));
        let region = largest_region(&mask)?;
        let (center, radius) = region.enclosing_circle()?;
        if radius < self.config.min_radius || radius > self.config.max_radius {
            debug!("Color region radius {radius:.1} outside plausible range");
            return None;
        }
        Some(TargetZone {
            center,
            radius,
            source: ZoneSource::AutoDetected,
        })
    }

    /// Re-scan if the cadence allows; returns the zone active for this frame
    pub fn update(&mut self, frame: Option<&RgbImage>, now: Duration) -> Option<&TargetZone> {
        if self.is_locked() || self.config.strategy == LocatorStrategy::Manual {
            return self.zone.as_ref();
        }
        let Some(frame) = frame else {
            return self.zone.as_ref();
        };

        let due = self
            .last_scan
            .map_or(true, |last| {
                now.saturating_sub(last).as_secs_f64() >= self.config.rescan_interval
            });
        if due {
            self.last_scan = Some(now);
            self.zone = self.locate(frame);
            match &self.zone {
                Some(z) => debug!(
                    "Target at ({:.0}, {:.0}) r={:.0}",
                    z.center.x, z.center.y, z.radius
                ),
                None => debug!("Target not found; retrying next scan"),
            }
        }
        self.zone.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn bright_spot(cx: u32, cy: u32) -> RgbImage {
        let mut frame = RgbImage::new(64, 48);
        for y in cy - 5..=cy + 5 {
            for x in cx - 5..=cx + 5 {
                frame.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        frame
    }

    fn brightness_config() -> LocatorConfig {
        LocatorConfig {
            strategy: LocatorStrategy::BrightnessPeak,
            blur_sigma: 0.0,
            min_area: 20,
            ..LocatorConfig::default()
        }
    }

    #[test]
    fn test_brightness_centroid() {
        let locator = TargetLocator::new(brightness_config());
        let zone = locator.locate(&bright_spot(20, 30)).unwrap();
        assert!((zone.center.x - 20.0).abs() < 1e-9);
        assert!((zone.center.y - 30.0).abs() < 1e-9);
        assert_eq!(zone.source, ZoneSource::AutoDetected);
    }

    #[test]
    fn test_dark_frame_not_found() {
        let locator = TargetLocator::new(brightness_config());
        assert!(locator.locate(&RgbImage::new(32, 32)).is_none());
    }

    #[test]
    fn test_rescan_cadence() {
        let mut locator = TargetLocator::new(brightness_config());
        let first = bright_spot(20, 30);
        let moved = bright_spot(40, 20);
        assert!(locator.update(Some(&first), Duration::from_secs(0)).is_some());
        // before the interval the old zone is kept
        let zone = *locator.update(Some(&moved), Duration::from_secs(1)).unwrap();
        assert!((zone.center.x - 20.0).abs() < 1e-9);
        let zone = *locator.update(Some(&moved), Duration::from_secs(3)).unwrap();
        assert!((zone.center.x - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_lock_wins_over_scan() {
        let mut locator = TargetLocator::new(brightness_config());
        locator.lock(PixelPoint::new(5.0, 5.0));
        let zone = *locator.update(Some(&bright_spot(20, 30)), Duration::from_secs(10)).unwrap();
        assert_eq!(zone.source, ZoneSource::ManualLock);
        locator.unlock();
        let zone = *locator.update(Some(&bright_spot(20, 30)), Duration::from_secs(11)).unwrap();
        assert_eq!(zone.source, ZoneSource::AutoDetected);
    }
}
