/// Live preview
///
/// Composites the first image of the selected folder with the current
/// parameters and shrinks the result to fit the preview pane. Nothing
/// is written to disk.
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::error::WatermarkError;
use crate::state::data::{Position, WatermarkProfile};
use crate::wm::{batch, compositor};

/// Build the preview image, or `None` when the folder has no candidates.
pub fn preview(
    folder: &Path,
    profile: &WatermarkProfile,
    position: Position,
    max_width: u32,
    max_height: u32,
) -> Result<Option<RgbImage>, WatermarkError> {
    let files = batch::candidate_files(folder);
    let Some(first) = files.first() else {
        return Ok(None);
    };

    let source = compositor::load_source(&folder.join(first))?;
    let composited = compositor::composite(&source, profile, position)?;
    Ok(Some(fit_within(composited, max_width, max_height)))
}

/// Shrink to fit inside the bounds, preserving aspect ratio. Images
/// already within bounds are returned untouched, never upscaled.
fn fit_within(img: RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    if img.width() <= max_width && img.height() <= max_height {
        return img;
    }
    DynamicImage::ImageRgb8(img)
        .resize(max_width, max_height, FilterType::Lanczos3)
        .to_rgb8()
}
