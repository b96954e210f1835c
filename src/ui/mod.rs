/// View helpers
///
/// - Product cards for the catalog grid (card.rs)
/// - The side-by-side comparison table (comparison.rs)
/// - Search and brand filter inputs (filters.rs)

pub mod card;
pub mod comparison;
pub mod filters;

use iced::widget::{button, column, container, row, text};
use iced::{Alignment, Color, Element, Length};

use crate::state::data::{MAX_COMPARISON_PRODUCTS, MIN_COMPARISON_PRODUCTS};
use crate::state::notify::{Notification, Severity};
use crate::Message;

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::from_rgb(0.18, 0.6, 0.32),
        Severity::Warning => Color::from_rgb(0.85, 0.55, 0.1),
        Severity::Error => Color::from_rgb(0.8, 0.2, 0.2),
    }
}

/// Dismissable banner for the latest notification
pub fn banner(notification: &Notification, seq: u64) -> Element<'_, Message> {
    let content = row![
        text(&notification.message)
            .size(15)
            .color(severity_color(notification.severity)),
        iced::widget::horizontal_space(),
        button("Dismiss")
            .on_press(Message::DismissNotification(seq))
            .style(button::text),
    ]
    .align_y(Alignment::Center);

    container(content)
        .padding([8, 16])
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

/// Bar above the grid while anything is selected for comparison
pub fn compare_bar<'a>(selected: usize, panel_visible: bool) -> Element<'a, Message> {
    let toggle = (selected >= MIN_COMPARISON_PRODUCTS).then(|| {
        button(if panel_visible {
            "Hide Comparison"
        } else {
            "Show Comparison"
        })
        .on_press(Message::TogglePanel)
        .style(button::primary)
    });

    let content = row![
        text(format!(
            "Compare Products ({}/{})",
            selected, MAX_COMPARISON_PRODUCTS
        ))
        .size(18),
        iced::widget::horizontal_space(),
        button("Clear All")
            .on_press(Message::ClearComparison)
            .style(button::secondary),
    ]
    .push_maybe(toggle)
    .spacing(12)
    .align_y(Alignment::Center);

    container(content)
        .padding(12)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

/// Shown in place of the grid when no product matches
pub fn empty_state<'a>() -> Element<'a, Message> {
    container(
        column![
            text("No products found").size(22),
            text("Try adjusting your search criteria or clear the filters.").size(14),
        ]
        .spacing(8)
        .align_x(Alignment::Center),
    )
    .padding(40)
    .center_x(Length::Fill)
    .into()
}
