/// Preview pane
///
/// Shows the composited sample image, or a hint while there is
/// nothing to show yet.
use iced::widget::image::Handle;
use iced::widget::{container, text};
use iced::{Element, Length};

use crate::Message;

pub fn view(preview: Option<&Handle>) -> Element<'static, Message> {
    let content: Element<'static, Message> = match preview {
        Some(handle) => iced::widget::image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => text("No preview. Pick a folder and a profile, then refresh.")
            .size(16)
            .into(),
    };

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .padding(16)
        .into()
}
