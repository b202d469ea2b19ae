/// Watermark compositing
///
/// Loads a source image with EXIF orientation applied, scales the
/// watermark to a fraction of the source width, places it at the
/// requested anchor and alpha-blends it, then flattens to RGB for
/// saving. Placement is never clamped; out-of-bounds regions are
/// clipped by the blend.
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage, RgbaImage};

use crate::error::WatermarkError;
use crate::state::data::{Position, WatermarkProfile};

/// Decode an image and apply its EXIF orientation, so a portrait photo
/// shot on a rotated camera composites the same way it displays.
fn load_oriented(path: &Path) -> Result<DynamicImage, image::ImageError> {
    let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Load a source photo for compositing.
pub fn load_source(path: &Path) -> Result<DynamicImage, WatermarkError> {
    load_oriented(path).map_err(|source| WatermarkError::SourceLoad {
        path: path.to_owned(),
        source,
    })
}

/// Load the watermark image as RGBA.
pub fn load_watermark(path: &Path) -> Result<RgbaImage, WatermarkError> {
    let img = image::open(path).map_err(|source| WatermarkError::WatermarkLoad {
        path: path.to_owned(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Target watermark dimensions: width is `scale` of the source width,
/// height keeps the watermark's aspect ratio. Never collapses to zero.
pub fn scaled_dimensions(source_width: u32, (wm_w, wm_h): (u32, u32), scale: f32) -> (u32, u32) {
    let target_w = (f64::from(source_width) * f64::from(scale)).round().max(1.0) as u32;
    let target_h = (f64::from(target_w) * f64::from(wm_h) / f64::from(wm_w))
        .round()
        .max(1.0) as u32;
    (target_w, target_h)
}

/// Composite with a freshly decoded watermark. For single images and previews.
pub fn composite(
    source: &DynamicImage,
    profile: &WatermarkProfile,
    position: Position,
) -> Result<RgbImage, WatermarkError> {
    let watermark = load_watermark(&profile.watermark_file)?;
    Ok(composite_loaded(source, &watermark, profile, position))
}

/// Composite with an already-decoded watermark. Batch runs decode the
/// watermark once and call this per file.
pub fn composite_loaded(
    source: &DynamicImage,
    watermark: &RgbaImage,
    profile: &WatermarkProfile,
    position: Position,
) -> RgbImage {
    let mut canvas = source.to_rgba8();
    let (target_w, target_h) =
        scaled_dimensions(canvas.width(), watermark.dimensions(), profile.scale);
    let scaled = imageops::resize(watermark, target_w, target_h, FilterType::Lanczos3);

    let (x, y) = position.origin(
        (canvas.width(), canvas.height()),
        (target_w, target_h),
        profile.margin,
    );
    imageops::overlay(&mut canvas, &scaled, x, y);

    DynamicImage::ImageRgba8(canvas).to_rgb8()
}
