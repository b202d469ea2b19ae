/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the profile store, the watermarking core, and the UI layer.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File extensions accepted as batch inputs, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tiff", "bmp"];

/// A named, persisted set of watermark parameters.
///
/// `scale` is stored as a fraction of the source image width in (0, 1];
/// the UI collects it as a percentage and converts before constructing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkProfile {
    /// Path to the watermark image (PNG with alpha is typical)
    #[serde(rename = "wm_file")]
    pub watermark_file: PathBuf,
    /// Watermark width as a fraction of the source width, in (0, 1]
    pub scale: f32,
    /// Distance in pixels between the watermark and the nearest edges
    pub margin: u32,
}

/// Where the watermark is anchored on the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
    Center,
}

impl Position {
    /// All positions, in the order the UI lists them.
    pub const ALL: [Position; 5] = [
        Position::BottomRight,
        Position::BottomLeft,
        Position::TopRight,
        Position::TopLeft,
        Position::Center,
    ];

    /// Top-left corner where the watermark is placed on the source.
    ///
    /// Computed in signed arithmetic and intentionally unclamped: a
    /// watermark larger than the source yields a negative origin and
    /// renders partially, clipped at the canvas edges.
    pub fn origin(
        self,
        (source_w, source_h): (u32, u32),
        (wm_w, wm_h): (u32, u32),
        margin: u32,
    ) -> (i64, i64) {
        let (sw, sh) = (i64::from(source_w), i64::from(source_h));
        let (ww, wh) = (i64::from(wm_w), i64::from(wm_h));
        let m = i64::from(margin);
        match self {
            Position::BottomRight => (sw - ww - m, sh - wh - m),
            Position::BottomLeft => (m, sh - wh - m),
            Position::TopRight => (sw - ww - m, m),
            Position::TopLeft => (m, m),
            Position::Center => ((sw - ww) / 2, (sh - wh) / 2),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Position::BottomRight => "Bottom right",
            Position::BottomLeft => "Bottom left",
            Position::TopRight => "Top right",
            Position::TopLeft => "Top left",
            Position::Center => "Center",
        })
    }
}

/// True when the path has a supported raster image extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_right_origin_accounts_for_margin() {
        let origin = Position::BottomRight.origin((1000, 800), (200, 80), 10);
        assert_eq!(origin, (790, 710));
    }

    #[test]
    fn center_origin_ignores_margin() {
        let origin = Position::Center.origin((1000, 800), (200, 80), 10);
        assert_eq!(origin, (400, 360));
    }

    #[test]
    fn corner_origins() {
        assert_eq!(Position::TopLeft.origin((1000, 800), (200, 80), 10), (10, 10));
        assert_eq!(
            Position::TopRight.origin((1000, 800), (200, 80), 10),
            (790, 10)
        );
        assert_eq!(
            Position::BottomLeft.origin((1000, 800), (200, 80), 10),
            (10, 710)
        );
    }

    #[test]
    fn oversized_watermark_yields_negative_origin() {
        let origin = Position::BottomRight.origin((100, 100), (300, 300), 0);
        assert_eq!(origin, (-200, -200));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_supported_image(Path::new("photo.JPG")));
        assert!(is_supported_image(Path::new("photo.jpeg")));
        assert!(is_supported_image(Path::new("photo.Png")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn profile_serializes_with_short_field_names() {
        let profile = WatermarkProfile {
            watermark_file: PathBuf::from("/tmp/logo.png"),
            scale: 0.2,
            margin: 10,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"wm_file\""));
        let back: WatermarkProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
