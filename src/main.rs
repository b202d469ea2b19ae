use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use iced::futures::{SinkExt, Stream};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, pick_list, progress_bar, row, text};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use tracing::{error, info, warn};

mod error;
mod logging;
mod open_folder;
mod state;
mod ui;
mod wm;

use state::data::{Position, WatermarkProfile, SUPPORTED_EXTENSIONS};
use state::profiles::ProfileStore;
use ui::profile_form::{FormMode, ProfileForm};
use wm::batch::BatchEvent;

/// Bounds of the preview pane, in logical pixels.
const PREVIEW_MAX_WIDTH: u32 = 520;
const PREVIEW_MAX_HEIGHT: u32 = 440;

/// Progress of the batch currently running, if any.
struct RunningBatch {
    processed: usize,
    total: usize,
    cancel: Arc<AtomicBool>,
}

/// Main application state
struct Watermarkable {
    /// The persisted profile collection
    profiles: ProfileStore,
    /// Name of the currently selected profile
    selected_profile: Option<String>,
    /// Folder whose images will be watermarked
    source_folder: Option<PathBuf>,
    /// Where the watermark is anchored
    position: Position,
    /// Profile form, shown in place of the preview while open
    form: Option<ProfileForm>,
    /// Rendered preview of the first image in the folder
    preview: Option<Handle>,
    /// The batch in flight, None when idle
    batch: Option<RunningBatch>,
    /// Output folder of the last finished batch
    last_output_dir: Option<PathBuf>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User picked a profile from the list
    ProfileSelected(String),
    /// User clicked "New" to create a profile
    NewProfile,
    /// User clicked "Edit" on the selected profile
    EditProfile,
    /// User clicked "Delete" on the selected profile
    DeleteProfile,
    /// Form field edits
    FormNameChanged(String),
    FormScaleChanged(String),
    FormMarginChanged(String),
    /// User clicked "Choose watermark..." in the form
    FormPickWatermark,
    /// User clicked "Save" in the form
    FormSave,
    /// User clicked "Cancel" in the form
    FormCancel,
    /// User clicked "Browse" to pick the source folder
    BrowseFolder,
    /// User picked a watermark position
    PositionSelected(Position),
    /// User asked for a fresh preview
    RefreshPreview,
    /// Background preview render finished
    PreviewReady(Result<Option<Handle>, String>),
    /// User clicked "Apply watermark"
    StartBatch,
    /// User clicked "Cancel" on a running batch
    CancelBatch,
    /// Progress from the background batch
    Batch(BatchEvent),
    /// User clicked "Open output folder"
    OpenOutputFolder,
}

impl Watermarkable {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let profiles = ProfileStore::load();
        let count = profiles.names().len();
        info!("Watermarkable started with {} profiles", count);

        let status = if profiles.is_empty() {
            "Welcome. Create a watermark profile to get started.".to_owned()
        } else {
            format!("Ready. {} profiles loaded.", count)
        };

        (
            Watermarkable {
                profiles,
                selected_profile: None,
                source_folder: None,
                position: Position::default(),
                form: None,
                preview: None,
                batch: None,
                last_output_dir: None,
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ProfileSelected(name) => {
                self.selected_profile = Some(name);
                self.refresh_preview()
            }
            Message::NewProfile => {
                self.form = Some(ProfileForm::create());
                Task::none()
            }
            Message::EditProfile => {
                if let Some(name) = &self.selected_profile {
                    if let Some(profile) = self.profiles.get(name) {
                        self.form = Some(ProfileForm::edit(name, profile));
                    }
                }
                Task::none()
            }
            Message::DeleteProfile => {
                let Some(name) = self.selected_profile.clone() else {
                    return Task::none();
                };
                let confirmed = rfd::MessageDialog::new()
                    .set_title("Delete profile")
                    .set_description(format!("Delete profile '{}'?", name))
                    .set_buttons(rfd::MessageButtons::YesNo)
                    .show()
                    == rfd::MessageDialogResult::Yes;
                if confirmed {
                    match self.profiles.delete(&name) {
                        Ok(()) => {
                            self.selected_profile = None;
                            self.preview = None;
                            self.status = format!("Deleted profile '{}'.", name);
                        }
                        Err(e) => {
                            error!("{}", e);
                            self.status = e.to_string();
                        }
                    }
                }
                Task::none()
            }
            Message::FormNameChanged(name) => {
                if let Some(form) = &mut self.form {
                    form.name = name;
                }
                Task::none()
            }
            Message::FormScaleChanged(scale) => {
                if let Some(form) = &mut self.form {
                    form.scale_percent = scale;
                }
                Task::none()
            }
            Message::FormMarginChanged(margin) => {
                if let Some(form) = &mut self.form {
                    form.margin = margin;
                }
                Task::none()
            }
            Message::FormPickWatermark => {
                if let Some(form) = &mut self.form {
                    let picked = FileDialog::new()
                        .set_title("Choose Watermark Image")
                        .add_filter("PNG image", &["png"])
                        .add_filter("Images", &SUPPORTED_EXTENSIONS)
                        .pick_file();
                    if picked.is_some() {
                        form.watermark_file = picked;
                    }
                }
                Task::none()
            }
            Message::FormSave => self.save_form(),
            Message::FormCancel => {
                self.form = None;
                Task::none()
            }
            Message::BrowseFolder => {
                let folder = FileDialog::new()
                    .set_title("Select Folder with Photos")
                    .pick_folder();
                if let Some(folder) = folder {
                    let count = wm::batch::candidate_files(&folder).len();
                    self.status = format!(
                        "{} supported images in {}.",
                        count,
                        folder.display()
                    );
                    self.source_folder = Some(folder);
                    return self.refresh_preview();
                }
                Task::none()
            }
            Message::PositionSelected(position) => {
                self.position = position;
                self.refresh_preview()
            }
            Message::RefreshPreview => self.refresh_preview(),
            Message::PreviewReady(result) => {
                match result {
                    Ok(Some(handle)) => {
                        self.preview = Some(handle);
                        self.status = "Preview updated.".to_owned();
                    }
                    Ok(None) => {
                        self.preview = None;
                        self.status = "No supported images in the selected folder.".to_owned();
                    }
                    Err(e) => {
                        warn!("Preview failed: {}", e);
                        self.status = format!("Preview failed: {}", e);
                    }
                }
                Task::none()
            }
            Message::StartBatch => self.start_batch(),
            Message::CancelBatch => {
                if let Some(batch) = &self.batch {
                    batch.cancel.store(true, Ordering::Relaxed);
                    self.status = "Cancelling...".to_owned();
                }
                Task::none()
            }
            Message::Batch(event) => {
                self.apply_batch_event(event);
                Task::none()
            }
            Message::OpenOutputFolder => {
                if let Some(dir) = &self.last_output_dir {
                    if let Err(e) = open_folder::open_in_file_manager(dir) {
                        self.status = format!("Cannot open {}: {}", dir.display(), e);
                    }
                }
                Task::none()
            }
        }
    }

    /// Persist the open form as a new or updated profile.
    fn save_form(&mut self) -> Task<Message> {
        let Some(form) = &mut self.form else {
            return Task::none();
        };
        let profile = match form.parsed() {
            Ok(profile) => profile,
            Err(e) => {
                form.error = Some(e.to_string());
                return Task::none();
            }
        };

        match form.mode.clone() {
            FormMode::Create => {
                let name = form.name.trim().to_owned();
                match self.profiles.create(&name, profile) {
                    Ok(true) => {
                        self.selected_profile = Some(name.clone());
                        self.form = None;
                        self.status = format!("Created profile '{}'.", name);
                        self.refresh_preview()
                    }
                    Ok(false) => {
                        form.error =
                            Some("Profile name is empty or already taken.".to_owned());
                        Task::none()
                    }
                    Err(e) => {
                        error!("{}", e);
                        form.error = Some(e.to_string());
                        Task::none()
                    }
                }
            }
            FormMode::Edit(name) => match self.profiles.update(&name, profile) {
                Ok(()) => {
                    self.form = None;
                    self.status = format!("Updated profile '{}'.", name);
                    self.refresh_preview()
                }
                Err(e) => {
                    error!("{}", e);
                    form.error = Some(e.to_string());
                    Task::none()
                }
            },
        }
    }

    /// Kick off a batch for the selected folder and profile.
    fn start_batch(&mut self) -> Task<Message> {
        if self.batch.is_some() {
            self.status = "A batch is already running.".to_owned();
            return Task::none();
        }
        let Some(folder) = self.source_folder.clone() else {
            self.status = "Pick a source folder first.".to_owned();
            return Task::none();
        };
        let Some(profile) = self.current_profile() else {
            self.status = "Pick a profile first.".to_owned();
            return Task::none();
        };

        let files = wm::batch::candidate_files(&folder);
        if files.is_empty() {
            self.status = "No supported images in the selected folder.".to_owned();
            return Task::none();
        }

        let total = files.len();
        let cancel = Arc::new(AtomicBool::new(false));
        self.batch = Some(RunningBatch {
            processed: 0,
            total,
            cancel: cancel.clone(),
        });
        self.status = format!("Watermarking {} files...", total);

        Task::run(
            batch_stream(folder, profile, self.position, files, cancel),
            Message::Batch,
        )
    }

    fn apply_batch_event(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Progress { processed, total } => {
                if let Some(batch) = &mut self.batch {
                    batch.processed = processed;
                    batch.total = total;
                }
                self.status = format!("Watermarked {} of {}...", processed, total);
            }
            BatchEvent::FileFailed { file, error } => {
                self.status = format!("Skipped {}: {}", file, error);
            }
            BatchEvent::Finished {
                succeeded,
                total,
                output_dir,
            } => {
                self.batch = None;
                self.status = format!(
                    "Done. {} of {} images watermarked into {}.",
                    succeeded,
                    total,
                    output_dir.display()
                );
                self.last_output_dir = Some(output_dir);
            }
            BatchEvent::Aborted { error } => {
                self.batch = None;
                self.status = format!("Batch failed to start: {}", error);
            }
        }
    }

    /// The profile currently selected in the list, cloned for background work.
    fn current_profile(&self) -> Option<WatermarkProfile> {
        self.selected_profile
            .as_ref()
            .and_then(|name| self.profiles.get(name))
            .cloned()
    }

    /// Re-render the preview in the background, if folder and profile are set.
    fn refresh_preview(&mut self) -> Task<Message> {
        let (Some(folder), Some(profile)) = (self.source_folder.clone(), self.current_profile())
        else {
            return Task::none();
        };
        let position = self.position;
        self.status = "Rendering preview...".to_owned();

        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || {
                    wm::preview::preview(
                        &folder,
                        &profile,
                        position,
                        PREVIEW_MAX_WIDTH,
                        PREVIEW_MAX_HEIGHT,
                    )
                    .map(|img| img.map(to_handle))
                    .map_err(|e| e.to_string())
                })
                .await
                .map_err(|e| e.to_string())?
            },
            Message::PreviewReady,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let profile_names = self.profiles.names();
        let has_profile = self.selected_profile.is_some();
        let can_run = has_profile && self.source_folder.is_some();

        let folder_label = self
            .source_folder
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "No folder selected".to_owned());

        let batch_controls: Element<Message> = match &self.batch {
            Some(batch) => row![
                button("Cancel").on_press(Message::CancelBatch).padding(10),
                progress_bar(0.0..=batch.total as f32, batch.processed as f32),
            ]
            .spacing(8)
            .align_y(Alignment::Center)
            .into(),
            None => button("Apply watermark")
                .on_press_maybe(can_run.then_some(Message::StartBatch))
                .padding(10)
                .into(),
        };

        let controls = column![
            text("Watermarkable").size(28),
            pick_list(
                profile_names,
                self.selected_profile.clone(),
                Message::ProfileSelected,
            )
            .placeholder("Select a profile")
            .width(Length::Fill),
            row![
                button("New").on_press(Message::NewProfile),
                button("Edit").on_press_maybe(has_profile.then_some(Message::EditProfile)),
                button("Delete").on_press_maybe(has_profile.then_some(Message::DeleteProfile)),
            ]
            .spacing(8),
            text(folder_label).size(14),
            button("Browse folder").on_press(Message::BrowseFolder),
            pick_list(
                Position::ALL,
                Some(self.position),
                Message::PositionSelected,
            )
            .width(Length::Fill),
            button("Refresh preview")
                .on_press_maybe(can_run.then_some(Message::RefreshPreview)),
            batch_controls,
            button("Open output folder")
                .on_press_maybe(self.last_output_dir.is_some().then_some(Message::OpenOutputFolder)),
            text(&self.status).size(14),
        ]
        .spacing(12)
        .padding(20)
        .width(340);

        let right: Element<Message> = match &self.form {
            Some(form) => form.view(),
            None => ui::preview_pane::view(self.preview.as_ref()),
        };

        row![
            container(controls).height(Length::Fill),
            container(right).width(Length::Fill).height(Length::Fill),
        ]
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    logging::init();

    iced::application(
        "Watermarkable",
        Watermarkable::update,
        Watermarkable::view,
    )
    .theme(Watermarkable::theme)
    .window_size((900.0, 540.0))
    .centered()
    .run_with(Watermarkable::new)
}

/// Convert a rendered preview into a widget handle.
fn to_handle(img: image::RgbImage) -> Handle {
    let (width, height) = img.dimensions();
    let rgba = image::DynamicImage::ImageRgb8(img).to_rgba8();
    Handle::from_rgba(width, height, rgba.into_raw())
}

/// Run the batch on a blocking thread, forwarding its events to the UI.
fn batch_stream(
    folder: PathBuf,
    profile: WatermarkProfile,
    position: Position,
    files: Vec<String>,
    cancel: Arc<AtomicBool>,
) -> impl Stream<Item = BatchEvent> {
    iced::stream::channel(16, move |mut output| async move {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let worker = tokio::task::spawn_blocking(move || {
            wm::batch::run(&folder, &profile, position, &files, &tx, &cancel);
        });
        while let Some(event) = rx.recv().await {
            if output.send(event).await.is_err() {
                break;
            }
        }
        let _ = worker.await;
    })
}
