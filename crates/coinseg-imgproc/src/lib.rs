#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// contour extraction and measurement module.
pub mod contours;

/// distance transform module.
pub mod distance_transform;

/// utilities to draw on images.
pub mod draw;

/// morphological operations module.
pub mod morphology;

/// module containing parallization utilities.
pub mod parallel;

/// operations to threshold images.
pub mod threshold;
