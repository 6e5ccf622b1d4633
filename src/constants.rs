//! Constants used throughout the library

/// Number of landmarks reported per detected hand
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Hard cap on hands processed per frame
pub const MAX_HANDS_PER_FRAME: usize = 2;

/// Landmark indices (anatomical)
pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// (tip, intermediate joint) pairs for the four non-thumb fingers
pub const FINGER_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

/// Default destination rectangle for the homography
pub const DEFAULT_DEST_WIDTH: f64 = 1920.0;
pub const DEFAULT_DEST_HEIGHT: f64 = 1080.0;

/// Default camera frame size
pub const DEFAULT_FRAME_WIDTH: f64 = 640.0;
pub const DEFAULT_FRAME_HEIGHT: f64 = 480.0;

/// Gesture defaults
pub const DEFAULT_THUMBS_UP_THRESHOLD: f64 = 0.7;
pub const DEFAULT_THUMB_WEIGHT: f64 = 0.4;
pub const DEFAULT_CURLED_FINGER_WEIGHT: f64 = 0.15;
pub const DEFAULT_THUMB_EXTENSION_MARGIN: f64 = 0.02;
pub const DEFAULT_PINCH_THRESHOLD: f64 = 0.08;
pub const DEFAULT_MIN_DETECTION_CONFIDENCE: f32 = 0.7;

/// Smoothing weight kept from the previous output
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.7;

/// Interaction defaults (seconds unless noted)
pub const DEFAULT_STABILITY_RADIUS: f64 = 0.03;
pub const DEFAULT_DWELL_SECONDS: f64 = 0.4;
pub const DEFAULT_DWELL_COOLDOWN: f64 = 1.0;
pub const DEFAULT_PINCH_COOLDOWN: f64 = 0.5;
pub const DEFAULT_PROXIMITY_COOLDOWN: f64 = 1.0;
pub const DEFAULT_TAP_WINDOW: f64 = 0.5;
pub const DEFAULT_TAP_COOLDOWN: f64 = 0.5;
pub const DEFAULT_COMMAND_QUEUE_CAPACITY: usize = 16;

/// Target locator defaults (pixels unless noted)
pub const DEFAULT_MANUAL_RADIUS: f64 = 40.0;
pub const DEFAULT_BRIGHTNESS_THRESHOLD: u8 = 240;
pub const DEFAULT_BLUR_SIGMA: f32 = 2.0;
pub const DEFAULT_MIN_REGION_AREA: usize = 50;
pub const DEFAULT_MIN_TARGET_RADIUS: f64 = 5.0;
pub const DEFAULT_MAX_TARGET_RADIUS: f64 = 200.0;
pub const DEFAULT_RESCAN_SECONDS: f64 = 3.0;

/// Minimum doubled triangle area (in Hartley-normalized units) for any three
/// calibration points; smaller means the quad is treated as collinear
pub const DEFAULT_DEGENERACY_EPSILON: f64 = 1e-3;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
