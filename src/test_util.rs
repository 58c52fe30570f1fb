//! On-disk image fixtures shared by the unit tests.

use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Write a gray image (all three channels equal per pixel) to `dir/name`,
/// encoded in whatever format the extension implies. `pixels` is row-major
/// and must hold `width * height` values.
pub fn write_gray_image(
    dir: &Path,
    name: &str,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> PathBuf {
    assert_eq!(pixels.len() as u32, width * height);

    let mut img = RgbImage::new(width, height);
    for (i, pixel) in img.pixels_mut().enumerate() {
        *pixel = Rgb([pixels[i]; 3]);
    }

    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}
