//! Configuration management for the hand interaction pipeline

use crate::{
    filters::{create_filter, PositionFilter},
    gesture::{GestureConfig, GestureKind},
    homography::DestinationRect,
    interaction::InteractionConfig,
    landmarks::InvertMode,
    locator::LocatorConfig,
    mapper::InteractionPoint,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Calibration and frame geometry
    pub calibration: CalibrationConfig,

    /// Hand selection
    pub hands: HandsConfig,

    /// Gesture heuristics
    pub gestures: GestureConfig,

    /// Coordinate mapping and smoothing
    pub mapping: MappingConfig,

    /// Trigger strategy and timing
    pub interaction: InteractionConfig,

    /// Target zone detection
    pub locator: LocatorConfig,
}

/// Calibration and frame geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Destination rectangle width in pixels
    pub destination_width: f64,

    /// Destination rectangle height in pixels
    pub destination_height: f64,

    /// Camera frame width in pixels
    pub frame_width: f64,

    /// Camera frame height in pixels
    pub frame_height: f64,

    /// Where the calibration is persisted; `None` keeps it in memory only
    pub artifact_path: Option<PathBuf>,

    /// Minimum normalized triangle area of the calibration quad
    pub degeneracy_epsilon: f64,
}

/// Hand selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandsConfig {
    /// Maximum hands kept per frame (at most 2)
    pub max_hands: usize,

    /// Detection confidence below which a hand is dropped (0.0-1.0)
    pub min_confidence: f32,

    /// Mirror applied to landmarks before anything else
    pub invert: InvertMode,
}

/// Coordinate mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Smoothing filter, `name[:param]`
    pub filter: String,

    /// Landmark that drives the tracked position
    pub interaction_point: InteractionPoint,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            destination_width: DEFAULT_DEST_WIDTH,
            destination_height: DEFAULT_DEST_HEIGHT,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            artifact_path: None,
            degeneracy_epsilon: DEFAULT_DEGENERACY_EPSILON,
        }
    }
}

impl CalibrationConfig {
    #[must_use]
    pub const fn destination(&self) -> DestinationRect {
        DestinationRect::new(self.destination_width, self.destination_height)
    }
}

impl Default for HandsConfig {
    fn default() -> Self {
        Self {
            max_hands: 1,
            min_confidence: crate::constants::DEFAULT_MIN_DETECTION_CONFIDENCE,
            invert: InvertMode::X,
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            filter: format!("exponential:{}", crate::constants::DEFAULT_SMOOTHING_ALPHA),
            interaction_point: InteractionPoint::IndexTip,
        }
    }
}

fn non_negative(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{what} must be a non-negative number")))
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the smoothing filter named in the mapping section
    pub fn create_filter(&self) -> Result<Box<dyn PositionFilter>> {
        create_filter(&self.mapping.filter)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Geometry
        let cal = &self.calibration;
        if cal.destination_width <= 0.0 || cal.destination_height <= 0.0 {
            return Err(Error::ConfigError(
                "Destination rectangle must have positive width and height".to_string(),
            ));
        }
        if cal.frame_width <= 0.0 || cal.frame_height <= 0.0 {
            return Err(Error::ConfigError(
                "Frame size must have positive width and height".to_string(),
            ));
        }
        non_negative(cal.degeneracy_epsilon, "Degeneracy epsilon")?;

        // Hands
        let max_hands = self.hands.max_hands;
        if max_hands == 0 || max_hands > crate::constants::MAX_HANDS_PER_FRAME {
            return Err(Error::ConfigError(format!(
                "max_hands must be between 1 and {}",
                crate::constants::MAX_HANDS_PER_FRAME
            )));
        }
        if !(0.0..=1.0).contains(&self.hands.min_confidence) {
            return Err(Error::ConfigError(
                "Minimum detection confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        // Gestures
        let g = &self.gestures;
        if !(0.0..=1.0).contains(&g.thumbs_up_threshold) {
            return Err(Error::ConfigError(
                "Thumbs-up threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        non_negative(g.thumb_weight, "Thumb weight")?;
        non_negative(g.curled_finger_weight, "Curled finger weight")?;
        non_negative(g.pinch_threshold, "Pinch threshold")?;
        non_negative(g.min_hand_span, "Minimum hand span")?;

        // Mapping
        create_filter(&self.mapping.filter)
            .map_err(|e| Error::ConfigError(format!("Invalid smoothing filter: {e}")))?;

        // Interaction
        let i = &self.interaction;
        if i.stability_radius <= 0.0 {
            return Err(Error::ConfigError("Stability radius must be greater than 0".to_string()));
        }
        non_negative(i.dwell_seconds, "Dwell seconds")?;
        non_negative(i.dwell_cooldown, "Dwell cooldown")?;
        non_negative(i.pinch_cooldown, "Pinch cooldown")?;
        non_negative(i.proximity_cooldown, "Proximity cooldown")?;
        non_negative(i.tap_window, "Tap window")?;
        non_negative(i.tap_cooldown, "Tap cooldown")?;
        if i.qualifying_gesture == GestureKind::None {
            return Err(Error::ConfigError(
                "Qualifying gesture must name a gesture; `none` never qualifies".to_string(),
            ));
        }
        if i.dwell_frames == Some(0) {
            return Err(Error::ConfigError("Dwell frames must be greater than 0".to_string()));
        }
        if i.command_queue_capacity == 0 {
            return Err(Error::ConfigError(
                "Command queue capacity must be greater than 0".to_string(),
            ));
        }

        // Locator
        let l = &self.locator;
        if l.manual_radius <= 0.0 {
            return Err(Error::ConfigError("Manual zone radius must be greater than 0".to_string()));
        }
        if l.min_radius > l.max_radius {
            return Err(Error::ConfigError(
                "Locator min_radius must not exceed max_radius".to_string(),
            ));
        }
        if (0..3).any(|c| l.hsv_lower[c] > l.hsv_upper[c]) {
            return Err(Error::ConfigError(
                "HSV lower bound must not exceed upper bound".to_string(),
            ));
        }
        if l.hsv_upper[0] > 180 {
            return Err(Error::ConfigError("HSV hue bound must be at most 180".to_string()));
        }
        non_negative(l.rescan_interval, "Re-scan interval")?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Interaction Configuration

# Calibration and frame geometry
calibration:
  destination_width: 1920.0
  destination_height: 1080.0
  frame_width: 640.0
  frame_height: 480.0
  artifact_path: "calibration.json"
  degeneracy_epsilon: 0.001

# Hand selection
hands:
  max_hands: 1
  min_confidence: 0.7
  invert: x

# Gesture heuristics
gestures:
  thumbs_up_threshold: 0.7
  thumb_weight: 0.4
  curled_finger_weight: 0.15
  thumb_extension_margin: 0.02
  pinch_threshold: 0.08
  min_hand_span: 0.0

# Coordinate mapping
mapping:
  filter: "exponential:0.7"
  interaction_point: index_tip

# Triggers
interaction:
  strategy: dwell
  qualifying_gesture: open_hand
  stability_radius: 0.03
  dwell_seconds: 0.4
  dwell_cooldown: 1.0
  pinch_cooldown: 0.5
  proximity_cooldown: 1.0
  tap_window: 0.5
  tap_cooldown: 0.5
  emit_touch: false
  command_queue_capacity: 16

# Target zone
locator:
  strategy: manual
  manual_radius: 40.0
  brightness_threshold: 240
  blur_sigma: 2.0
  min_area: 50
  hsv_lower: [35, 80, 80]
  hsv_upper: [85, 255, 255]
  min_radius: 5.0
  max_radius: 200.0
  rescan_interval: 3.0
  lock_path: "target_lock.json"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_example_parses() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.hands.invert, InvertMode::X);
        assert_eq!(config.mapping.filter, "exponential:0.7");
        assert_eq!(config.locator.lock_path, Some(PathBuf::from("target_lock.json")));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_yaml::from_str("interaction:\n  strategy: pinch\n").unwrap();
        assert_eq!(config.interaction.strategy, crate::interaction::TriggerStrategy::Pinch);
        assert_eq!(config.calibration, CalibrationConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        config.hands.max_hands = 3;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.mapping.filter = "kalman".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.interaction.dwell_frames = Some(0);
        assert!(config.validate().is_err());
    }
}
