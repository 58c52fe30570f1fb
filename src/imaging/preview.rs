//! Scaled, re-encoded previews for on-screen display.

use image::imageops::FilterType;

use super::handle::{self, ImageHandle};
use super::ImagingError;

/// JPEG quality used when encoding previews.
pub const PREVIEW_QUALITY: u8 = 50;

/// A display-only rendition of an image. Never used for saving.
pub struct Preview {
    pub bytes: Vec<u8>,
    pub quality: u8,
}

/// Scale `image` to fit within `target` (width, height) preserving aspect
/// ratio, then encode it at reduced quality.
///
/// The caller passes an already-disposable handle; nothing is cloned or
/// re-decoded here. Output is deterministic for a given buffer and target.
pub fn render(image: &ImageHandle, target: (u32, u32)) -> Result<Preview, ImagingError> {
    let (width, height) = target;
    let scaled = image
        .buffer()
        .resize(width.max(1), height.max(1), FilterType::Triangle);

    let bytes = handle::encode_jpeg(&scaled, PREVIEW_QUALITY).map_err(|source| {
        ImagingError::Encode {
            path: image.source_path().to_path_buf(),
            source,
        }
    })?;

    Ok(Preview {
        bytes,
        quality: PREVIEW_QUALITY,
    })
}
