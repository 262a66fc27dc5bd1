/* Copyright 2020 @TwoCookingMice */

use crate::math::bitmap::Bitmap;

use exr::prelude::*;

// Read a histogram stored by `write_exr_to_file`. Only the red channel is used.
pub fn read_exr_from_file(file_path: &str) -> std::result::Result<Bitmap, String> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| Bitmap::new(resolution.width(), resolution.height()),
            |bitmap, position, (r, _g, _b, _a): (f32, f32, f32, f32)| {
                bitmap[(position.x(), position.y())] = r;
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)
        .map_err(|e| format!("failed to read exr {}: {}", file_path, e))?;

    let bitmap = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded, width = {}, height = {}.", bitmap.width(), bitmap.height());
    Ok(bitmap)
}

// Write a histogram as a grey OpenEXR image, values untouched.
pub fn write_exr_to_file(bitmap: &Bitmap, file_path: &str) -> std::result::Result<(), String> {
    log::info!("Starting writing openexr images: {}.", file_path);

    let width = bitmap.width();
    write_rgb_file(file_path, width, bitmap.height(), |x, y| {
        let v = bitmap.data()[y * width + x];
        (v, v, v)
    })
    .map_err(|e| format!("failed to write exr {}: {}", file_path, e))?;

    log::info!("EXR written to: {}.", file_path);
    Ok(())
}
