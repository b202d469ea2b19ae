/// Watermarking core
///
/// Pure image work lives here, kept free of UI concerns:
/// - Compositing a watermark onto a single image (compositor.rs)
/// - Running a whole folder with progress events (batch.rs)
/// - Building the on-screen preview thumbnail (preview.rs)
pub mod batch;
pub mod compositor;
pub mod preview;
