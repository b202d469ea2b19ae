/// Batch watermarking
///
/// Scans a folder for supported images and watermarks each one into an
/// output subfolder. One bad file never stops the run: failures are
/// logged, reported as events and skipped. The caller observes progress
/// through a channel and may cancel between files.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};
use walkdir::WalkDir;

use crate::error::WatermarkError;
use crate::state::data::{is_supported_image, Position, WatermarkProfile};
use crate::wm::compositor;

/// Subfolder created inside the source folder for watermarked copies.
pub const OUTPUT_DIR_NAME: &str = "Avec WaterMark";

/// Progress reported while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// A file finished successfully. `processed` counts successes so far.
    Progress { processed: usize, total: usize },
    /// A file failed and was skipped.
    FileFailed { file: String, error: String },
    /// The run ended, whether complete or cancelled.
    Finished {
        succeeded: usize,
        total: usize,
        output_dir: PathBuf,
    },
    /// The run could not start (output dir or watermark unavailable).
    Aborted { error: String },
}

/// Supported image files directly inside `folder`, sorted by name.
pub fn candidate_files(folder: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_supported_image(entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
        .collect();
    files.sort();
    files
}

/// Output name for a processed file: `photo.jpg` becomes `photo_wm.jpg`.
pub fn output_file_name(file: &str) -> String {
    let path = Path::new(file);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_wm.{ext}"),
        None => format!("{stem}_wm"),
    }
}

/// Watermark every file in `files`, sending events as the run advances.
///
/// The watermark is decoded once up front. `cancel` is consulted between
/// files; a cancelled run still emits `Finished` with the counts so far.
pub fn run(
    folder: &Path,
    profile: &WatermarkProfile,
    position: Position,
    files: &[String],
    events: &UnboundedSender<BatchEvent>,
    cancel: &AtomicBool,
) {
    let output_dir = folder.join(OUTPUT_DIR_NAME);
    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        error!("Cannot create {}: {}", output_dir.display(), e);
        let _ = events.send(BatchEvent::Aborted {
            error: format!("cannot create {}: {}", output_dir.display(), e),
        });
        return;
    }

    let watermark = match compositor::load_watermark(&profile.watermark_file) {
        Ok(wm) => wm,
        Err(e) => {
            error!("{}", e);
            let _ = events.send(BatchEvent::Aborted {
                error: e.to_string(),
            });
            return;
        }
    };

    let total = files.len();
    let mut succeeded = 0;
    info!("Starting batch of {} files in {}", total, folder.display());

    for file in files {
        if cancel.load(Ordering::Relaxed) {
            info!("Batch cancelled after {} of {} files", succeeded, total);
            break;
        }
        match process_file(folder, &output_dir, file, profile, &watermark, position) {
            Ok(()) => {
                succeeded += 1;
                let _ = events.send(BatchEvent::Progress {
                    processed: succeeded,
                    total,
                });
            }
            Err(e) => {
                error!("Skipping {}: {}", file, e);
                let _ = events.send(BatchEvent::FileFailed {
                    file: file.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!("Batch finished: {} of {} files watermarked", succeeded, total);
    let _ = events.send(BatchEvent::Finished {
        succeeded,
        total,
        output_dir,
    });
}

fn process_file(
    folder: &Path,
    output_dir: &Path,
    file: &str,
    profile: &WatermarkProfile,
    watermark: &image::RgbaImage,
    position: Position,
) -> Result<(), WatermarkError> {
    let source = compositor::load_source(&folder.join(file))?;
    let out = compositor::composite_loaded(&source, watermark, profile, position);

    let out_path = output_dir.join(output_file_name(file));
    out.save(&out_path).map_err(|source| WatermarkError::OutputWrite {
        path: out_path.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use std::path::PathBuf;
    use tokio::sync::mpsc;

    fn write_png(path: &Path, w: u32, h: u32) {
        let img: image::RgbaImage = ImageBuffer::from_pixel(w, h, Rgba([255, 255, 255, 255]));
        img.save(path).unwrap();
    }

    fn setup_folder(dir: &Path) -> WatermarkProfile {
        write_png(&dir.join("a.png"), 100, 80);
        write_png(&dir.join("b.png"), 120, 90);
        write_png(&dir.join("c.png"), 90, 60);
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let wm_path = dir.join("logo_source.png");
        write_png(&wm_path, 40, 20);
        WatermarkProfile {
            watermark_file: wm_path,
            scale: 0.2,
            margin: 5,
        }
    }

    fn collect(rx: &mut mpsc::UnboundedReceiver<BatchEvent>) -> Vec<BatchEvent> {
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        events
    }

    #[test]
    fn lists_only_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        setup_folder(dir.path());
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let files = candidate_files(dir.path());
        assert_eq!(files, vec!["a.png", "b.png", "c.png", "logo_source.png"]);
    }

    #[test]
    fn output_names_append_suffix_before_extension() {
        assert_eq!(output_file_name("photo.jpg"), "photo_wm.jpg");
        assert_eq!(output_file_name("trip.photo.PNG"), "trip.photo_wm.PNG");
    }

    #[test]
    fn watermarks_every_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let profile = setup_folder(dir.path());
        let files = vec!["a.png".to_owned(), "b.png".to_owned(), "c.png".to_owned()];
        let (tx, mut rx) = mpsc::unbounded_channel();

        run(
            dir.path(),
            &profile,
            Position::BottomRight,
            &files,
            &tx,
            &AtomicBool::new(false),
        );

        let out = dir.path().join(OUTPUT_DIR_NAME);
        assert!(out.join("a_wm.png").exists());
        assert!(out.join("b_wm.png").exists());
        assert!(out.join("c_wm.png").exists());
        assert!(!out.join("notes_wm.txt").exists());
        assert!(dir.path().join("notes.txt").exists());

        let events = collect(&mut rx);
        assert!(matches!(
            events.last(),
            Some(BatchEvent::Finished {
                succeeded: 3,
                total: 3,
                ..
            })
        ));
    }

    #[test]
    fn corrupt_file_is_skipped_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let profile = setup_folder(dir.path());
        std::fs::write(dir.path().join("broken.jpg"), b"not an image").unwrap();
        let files = vec!["a.png".to_owned(), "broken.jpg".to_owned(), "c.png".to_owned()];
        let (tx, mut rx) = mpsc::unbounded_channel();

        run(
            dir.path(),
            &profile,
            Position::Center,
            &files,
            &tx,
            &AtomicBool::new(false),
        );

        let out = dir.path().join(OUTPUT_DIR_NAME);
        assert!(out.join("a_wm.png").exists());
        assert!(!out.join("broken_wm.jpg").exists());
        assert!(out.join("c_wm.png").exists());

        let events = collect(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, BatchEvent::FileFailed { file, .. } if file == "broken.jpg")));
        assert!(matches!(
            events.last(),
            Some(BatchEvent::Finished {
                succeeded: 2,
                total: 3,
                ..
            })
        ));
    }

    #[test]
    fn cancellation_stops_before_the_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let profile = setup_folder(dir.path());
        let files = vec!["a.png".to_owned(), "b.png".to_owned()];
        let (tx, mut rx) = mpsc::unbounded_channel();

        run(
            dir.path(),
            &profile,
            Position::BottomRight,
            &files,
            &tx,
            &AtomicBool::new(true),
        );

        assert!(!dir.path().join(OUTPUT_DIR_NAME).join("a_wm.png").exists());
        let events = collect(&mut rx);
        assert!(matches!(
            events.last(),
            Some(BatchEvent::Finished {
                succeeded: 0,
                total: 2,
                ..
            })
        ));
    }

    #[test]
    fn missing_watermark_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        setup_folder(dir.path());
        let profile = WatermarkProfile {
            watermark_file: PathBuf::from("/nonexistent/logo.png"),
            scale: 0.2,
            margin: 5,
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        run(
            dir.path(),
            &profile,
            Position::BottomRight,
            &["a.png".to_owned()],
            &tx,
            &AtomicBool::new(false),
        );

        let events = collect(&mut rx);
        assert!(matches!(events.as_slice(), [BatchEvent::Aborted { .. }]));
    }

    #[test]
    fn rerunning_overwrites_existing_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let profile = setup_folder(dir.path());
        let files = vec!["a.png".to_owned()];
        let (tx, _rx) = mpsc::unbounded_channel();

        run(
            dir.path(),
            &profile,
            Position::BottomRight,
            &files,
            &tx,
            &AtomicBool::new(false),
        );
        run(
            dir.path(),
            &profile,
            Position::BottomRight,
            &files,
            &tx,
            &AtomicBool::new(false),
        );

        assert!(dir.path().join(OUTPUT_DIR_NAME).join("a_wm.png").exists());
    }
}
