//! Image loading and processing.
//!
//! This module handles:
//! - Decoding raster images into handles the rest of the app works on
//! - Black/white thresholding
//! - Generating scaled, re-encoded previews for display

pub mod handle;
pub mod preview;
pub mod threshold;

pub use handle::ImageHandle;
pub use preview::Preview;

use std::path::PathBuf;

/// Errors raised by image decode, encode and write operations.
///
/// Decode failures abort the operation that triggered them; write failures
/// are reported per file so a batch save can keep going.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("failed to decode image {path:?}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to write image {path:?}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to encode image {path:?}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}
