//! Black/white pixel classification.

use image::GrayImage;

pub const BLACK: u8 = 0;
pub const WHITE: u8 = 255;

/// Classify a grayscale intensity against a cutoff fraction in `[0, 1]`.
///
/// Returns black when the intensity is strictly below `255 * fraction`,
/// white otherwise.
pub fn classify(intensity: u8, fraction: f32) -> u8 {
    if f32::from(intensity) < 255.0 * fraction {
        BLACK
    } else {
        WHITE
    }
}

/// Apply `classify` to every pixel of a grayscale buffer.
pub fn binarize(buffer: &mut GrayImage, fraction: f32) {
    for pixel in buffer.pixels_mut() {
        pixel.0[0] = classify(pixel.0[0], fraction);
    }
}
