//! Utility functions for image processing on camera frames.

pub mod image_conversion;
