// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::{ Float, Vector3f };

use image::{ Rgb, RgbImage };

/// Map an averaged exit histogram to 8 bit pixels: each cell is clamped to
/// [0, 1], gamma corrected and tinted by `color`.
pub fn tone_map(bitmap: &Bitmap, color: &Vector3f, gamma: Float) -> RgbImage {
    let inv_gamma = 1.0 / gamma;
    let mut img = RgbImage::new(bitmap.width() as u32, bitmap.height() as u32);
    for y in 0..bitmap.height() {
        for x in 0..bitmap.width() {
            let v = bitmap[(x, y)].max(0.0).min(1.0).powf(inv_gamma);
            let channel = |c: Float| (255.0 * c * v) as u8;
            img.put_pixel(x as u32, y as u32, Rgb([channel(color.x), channel(color.y), channel(color.z)]));
        }
    }
    img
}

/// Tone map `bitmap` and save it, the format follows the extension of
/// `file_path` (png, ppm, ...).
pub fn write_image_to_file(bitmap: &Bitmap,
                           color: &Vector3f,
                           gamma: Float,
                           file_path: &str) -> std::result::Result<(), String> {
    log::info!("Starting writing image: {}.", file_path);
    tone_map(bitmap, color, gamma)
        .save(file_path)
        .map_err(|e| format!("failed to write image {}: {}", file_path, e))?;
    log::info!("Image written to: {}.", file_path);
    Ok(())
}
