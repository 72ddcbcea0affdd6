#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use coinseg_image as image;

#[doc(inline)]
pub use coinseg_imgproc as imgproc;

#[doc(inline)]
pub use coinseg_io as io;

/// Error type of the segmentation pipeline.
pub mod error;

/// The coin segmentation pipeline and its parameters.
pub mod segmentation;

pub use crate::error::SegmentationError;
