//! Utility functions for image processing
//!
//! This module provides helpers shared by the measurement stages:
//! - Grayscale conversion (RGB to luminance)
//! - Gaussian smoothing
//! - HSV colour conversion and skin-tone classification
//! - Geometry (areas, polygon simplification, hulls, rotated extents)

pub mod blur;
pub mod color;
pub mod geometry;
pub mod grayscale;
