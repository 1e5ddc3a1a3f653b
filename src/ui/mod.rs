pub mod form;
pub mod list;

pub use form::{FormMessage, LayerForm};
pub use list::ListMessage;

use iced::{
    widget::{button, column, container, row, text},
    Color, Element, Length,
};

use crate::domain::{DeliveryStatus, Notification, NotificationKind};

/// Transient status banner for the latest notification
pub fn alert<Message: 'static>(notification: &Notification) -> Element<'_, Message> {
    let color = match notification.kind {
        NotificationKind::Success => Color::from_rgb(0.16, 0.65, 0.27),
        NotificationKind::Error => Color::from_rgb(0.85, 0.22, 0.26),
        NotificationKind::Info => Color::from_rgb(0.09, 0.63, 0.72),
    };

    container(text(&notification.text).size(14).color(color))
        .padding(10)
        .width(Length::Fill)
        .into()
}

/// In-flight download card with a dismiss control. Dismissing only hides the
/// indicator; a dispatched save keeps running.
pub fn delivery_indicator<Message: Clone + 'static>(
    status: &DeliveryStatus,
    on_dismiss: Message,
) -> Element<'_, Message> {
    row![
        column![
            text("Downloading Layer").size(14),
            text(&status.file_name).size(12),
            text("Your download should start automatically...").size(12),
        ]
        .spacing(2)
        .width(Length::Fill),
        button(text("x").size(14)).on_press(on_dismiss).padding([5, 10]),
    ]
    .spacing(10)
    .into()
}
