//! Decoded image handle with the operations the app needs:
//! open, fresh re-decode, threshold, encode to bytes, save to disk.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::threshold;
use super::ImagingError;

/// Quality used when saving lossy output formats.
pub const DEFAULT_QUALITY: u8 = 90;

/// A single decoded raster image tied to the file it came from.
///
/// The buffer is normalized to 3-channel RGB on open so grayscale
/// conversion behaves the same for every input format. Mutations stay
/// local to the handle; `reopen` always goes back to the file on disk.
#[derive(Debug)]
pub struct ImageHandle {
    source_path: PathBuf,
    buffer: DynamicImage,
    compression_quality: u8,
}

impl ImageHandle {
    /// Decode the image at `path`.
    ///
    /// Fails when the file is missing, unreadable, or not a supported
    /// raster format.
    pub fn open(path: &Path) -> Result<Self, ImagingError> {
        let decoded = image::open(path).map_err(|source| ImagingError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            source_path: path.to_path_buf(),
            buffer: DynamicImage::ImageRgb8(decoded.to_rgb8()),
            compression_quality: DEFAULT_QUALITY,
        })
    }

    /// Return an independent handle re-decoded from the source path.
    ///
    /// Mutations applied to either handle never affect the other. Callers
    /// that need "threshold from the original" must reopen first, since
    /// `threshold` operates on whatever the buffer currently holds.
    pub fn reopen(&self) -> Result<Self, ImagingError> {
        Self::open(&self.source_path)
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.buffer.width(), self.buffer.height())
    }

    pub fn buffer(&self) -> &DynamicImage {
        &self.buffer
    }

    /// Threshold the image in place: convert to grayscale, then map each
    /// pixel to black below `fraction * 255` and white otherwise.
    ///
    /// Calling this twice composes: the second call thresholds the
    /// already-binarized buffer, not the original pixels.
    pub fn threshold(&mut self, fraction: f32) {
        let mut gray = self.buffer.to_luma8();
        threshold::binarize(&mut gray, fraction);
        self.buffer = DynamicImage::ImageLuma8(gray);
    }

    /// Serialize the current buffer to JPEG bytes at the given quality.
    pub fn encode(&self, quality: u8) -> Result<Vec<u8>, ImagingError> {
        encode_jpeg(&self.buffer, quality).map_err(|source| ImagingError::Encode {
            path: self.source_path.clone(),
            source,
        })
    }

    /// Write the current buffer to `path`, inferring the output format
    /// from the extension. JPEG output uses the handle's compression
    /// quality; other formats use their encoder defaults.
    pub fn save(&self, path: &Path) -> Result<(), ImagingError> {
        let write_error = |source| ImagingError::Write {
            path: path.to_path_buf(),
            source,
        };

        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);

        if matches!(extension.as_deref(), Some("jpg" | "jpeg")) {
            let file = File::create(path)
                .map_err(|err| write_error(image::ImageError::IoError(err)))?;
            let mut writer = BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(&mut writer, self.compression_quality);
            self.buffer.write_with_encoder(encoder).map_err(write_error)?;
            writer
                .flush()
                .map_err(|err| write_error(image::ImageError::IoError(err)))?;
        } else {
            self.buffer.save(path).map_err(write_error)?;
        }

        Ok(())
    }
}

/// JPEG-encode any buffer into memory. Shared by `ImageHandle::encode`
/// and the preview renderer.
pub(crate) fn encode_jpeg(
    image: &DynamicImage,
    quality: u8,
) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    image.write_with_encoder(encoder)?;
    Ok(bytes)
}
