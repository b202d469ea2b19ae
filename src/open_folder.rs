/// Open a folder in the platform file manager
use std::io;
use std::path::Path;
use std::process::Command;

#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(all(unix, not(target_os = "macos")))]
const OPENER: &str = "xdg-open";

/// Spawn the file manager pointed at `path`. The child is not awaited.
pub fn open_in_file_manager(path: &Path) -> io::Result<()> {
    Command::new(OPENER).arg(path).spawn().map(|_| ())
}
