/// Logging setup
///
/// Writes timestamped log lines to an append-only file in the per-user
/// data directory. Falls back to stderr when the file cannot be opened
/// so early failures are still visible.
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Per-user location of the application log file.
pub fn log_file_path() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .expect("no data or home directory available")
        .join("watermarkable")
        .join("watermarkable.log")
}

/// Install the global subscriber. Call once, before any log statement.
pub fn init() {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let timer = ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_owned());
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_timer(timer)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_timer(timer)
                .with_writer(std::io::stderr)
                .init();
            tracing::warn!("Cannot open log file {}: {}", path.display(), e);
        }
    }
}
