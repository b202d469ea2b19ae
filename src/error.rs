use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the watermarking core.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// Out-of-range or missing profile parameters, caught before persistence.
    #[error("{0}")]
    Config(String),

    #[error("cannot load source image {path}: {source}")]
    SourceLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("cannot load watermark image {path}: {source}")]
    WatermarkLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("cannot write output image {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("cannot save profiles: {0}")]
    Persistence(#[source] std::io::Error),
}
