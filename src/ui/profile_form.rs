/// Profile editor form
///
/// Collects the fields of a watermark profile as raw text and turns
/// them into validated parameters on save. Shown in place of the
/// preview pane while a profile is being created or edited.
use std::path::PathBuf;

use iced::widget::{button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::error::WatermarkError;
use crate::state::data::WatermarkProfile;
use crate::state::profiles::{validate_params, MAX_MARGIN, MAX_SCALE_PERCENT, MIN_SCALE_PERCENT};
use crate::Message;

/// Whether the form creates a new profile or edits an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// In-progress form state. Fields stay as entered text until save.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub mode: FormMode,
    pub name: String,
    pub watermark_file: Option<PathBuf>,
    pub scale_percent: String,
    pub margin: String,
    pub error: Option<String>,
}

impl ProfileForm {
    /// An empty form with the usual starting values.
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            watermark_file: None,
            scale_percent: "20".to_owned(),
            margin: "10".to_owned(),
            error: None,
        }
    }

    /// A form pre-filled from an existing profile.
    pub fn edit(name: &str, profile: &WatermarkProfile) -> Self {
        Self {
            mode: FormMode::Edit(name.to_owned()),
            name: name.to_owned(),
            watermark_file: Some(profile.watermark_file.clone()),
            scale_percent: ((profile.scale * 100.0).round() as u32).to_string(),
            margin: profile.margin.to_string(),
            error: None,
        }
    }

    /// Validate the entered fields into profile parameters.
    pub fn parsed(&self) -> Result<WatermarkProfile, WatermarkError> {
        let watermark_file = self
            .watermark_file
            .clone()
            .ok_or_else(|| WatermarkError::Config("choose a watermark image".to_owned()))?;
        let scale_percent: u32 = self.scale_percent.trim().parse().map_err(|_| {
            WatermarkError::Config(format!(
                "scale must be a whole number between {MIN_SCALE_PERCENT} and {MAX_SCALE_PERCENT}"
            ))
        })?;
        let margin: u32 = self.margin.trim().parse().map_err(|_| {
            WatermarkError::Config(format!("margin must be a whole number up to {MAX_MARGIN}"))
        })?;
        validate_params(scale_percent, margin)?;
        Ok(WatermarkProfile {
            watermark_file,
            scale: scale_percent as f32 / 100.0,
            margin,
        })
    }

    /// Build the form view.
    pub fn view(&self) -> Element<Message> {
        let title = match &self.mode {
            FormMode::Create => "New profile".to_owned(),
            FormMode::Edit(name) => format!("Edit profile '{name}'"),
        };

        let watermark_label = self
            .watermark_file
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "No watermark chosen".to_owned());

        let mut fields = column![text(title).size(24)].spacing(12);

        if self.mode == FormMode::Create {
            fields = fields
                .push(text_input("Profile name", &self.name).on_input(Message::FormNameChanged));
        }

        fields = fields
            .push(
                row![
                    text(watermark_label).size(14).width(Length::Fill),
                    button("Choose watermark...").on_press(Message::FormPickWatermark),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            )
            .push(
                row![
                    text(format!(
                        "Scale ({MIN_SCALE_PERCENT}-{MAX_SCALE_PERCENT} % of width)"
                    ))
                    .size(14)
                    .width(Length::Fill),
                    text_input("20", &self.scale_percent)
                        .on_input(Message::FormScaleChanged)
                        .width(80),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            )
            .push(
                row![
                    text(format!("Margin (0-{MAX_MARGIN} px)"))
                        .size(14)
                        .width(Length::Fill),
                    text_input("10", &self.margin)
                        .on_input(Message::FormMarginChanged)
                        .width(80),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            );

        if let Some(error) = &self.error {
            fields = fields.push(text(error).size(14).style(text::danger));
        }

        fields = fields.push(
            row![
                button("Save").on_press(Message::FormSave).padding(10),
                button("Cancel").on_press(Message::FormCancel).padding(10),
            ]
            .spacing(12),
        );

        container(fields).padding(20).width(Length::Fill).into()
    }
}
