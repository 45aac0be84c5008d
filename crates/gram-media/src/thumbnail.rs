//! Thumbnail derivation
//!
//! Thumbnails live at a deterministic path next to their source (the
//! source path plus a fixed suffix), bounded to 500x500 and stored as
//! JPEG. Deriving an already-derived thumbnail is a no-op, so replays
//! and edits never redo the work.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba};
use imageproc::drawing::{draw_polygon_mut, Blend};
use imageproc::point::Point;

use crate::error::MediaError;

/// Bounding box thumbnails are scaled into
const MAX_DIMENSION: u32 = 500;

/// Tint of the translucent play glyph composited onto video thumbnails
const GLYPH_COLOR: Rgba<u8> = Rgba([0xe1, 0xe0, 0xe2, 0x99]);

/// Derive a JPEG thumbnail for an image file
///
/// Downscales to fit inside 500x500 preserving aspect ratio; images that
/// already fit are re-encoded unscaled. No-op when `dest` exists.
pub fn derive_image_thumbnail(source: &Path, dest: &Path) -> Result<(), MediaError> {
    if dest.exists() {
        return Ok(());
    }

    let image = image::open(source)?;
    let (width, height) = image.dimensions();

    let thumbnail = if width > MAX_DIMENSION || height > MAX_DIMENSION {
        image.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        image
    };

    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(thumbnail.to_rgb8()).save_with_format(dest, ImageFormat::Jpeg)?;

    Ok(())
}

/// Composite a translucent right-pointing triangle onto a video thumbnail
///
/// The glyph is centered in a square covering half the shorter thumbnail
/// dimension, marking the artifact as playable.
pub fn composite_play_glyph(thumbnail: &Path) -> Result<(), MediaError> {
    let image = image::open(thumbnail)?.to_rgba8();
    let (width, height) = image.dimensions();

    let icon = width.min(height) / 2;
    let glyph_width = (icon as f32 * 0.6) as u32;
    let glyph_height = (icon as f32 * 0.5) as u32;
    if glyph_width < 2 || glyph_height < 2 {
        return Ok(());
    }

    let offset_x = (width - icon) / 2;
    let offset_y = (height - icon) / 2;
    let left = (offset_x + (icon - glyph_width) / 2) as i32;
    let top = (offset_y + (icon - glyph_height) / 2) as i32;
    let right = left + glyph_width as i32;
    let bottom = top + glyph_height as i32;
    let middle = (offset_y + icon / 2) as i32;

    let mut canvas = Blend(image);
    draw_polygon_mut(
        &mut canvas,
        &[
            Point::new(left, top),
            Point::new(right, middle),
            Point::new(left, bottom),
        ],
        GLYPH_COLOR,
    );

    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas.0).to_rgb8())
        .save_with_format(thumbnail, ImageFormat::Jpeg)?;

    Ok(())
}
