/// Product card shown in the catalog grid
use iced::widget::{button, column, container, row, text, Column};
use iced::{Element, Length};

use super::comparison::format_price;
use crate::state::data::{Product, MAX_COMPARISON_PRODUCTS};
use crate::Message;

pub const CARD_WIDTH: f32 = 260.0;

/// Features listed on a card before truncating
const FEATURE_PREVIEW: usize = 3;

/// State of the compare button on one card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareButton {
    /// Product is selected; pressing removes it
    Remove,
    /// Product can be added
    Add,
    /// Selection is full, or the saved list has not loaded yet
    Disabled,
}

impl CompareButton {
    pub fn new(in_comparison: bool, can_add: bool, loaded: bool) -> Self {
        match (loaded, in_comparison, can_add) {
            (false, _, _) => CompareButton::Disabled,
            (true, true, _) => CompareButton::Remove,
            (true, false, true) => CompareButton::Add,
            (true, false, false) => CompareButton::Disabled,
        }
    }

    fn label(self) -> String {
        match self {
            CompareButton::Remove => "Remove from Compare".to_string(),
            CompareButton::Add => "Add to Compare".to_string(),
            CompareButton::Disabled => format!(
                "Compare Full ({}/{})",
                MAX_COMPARISON_PRODUCTS, MAX_COMPARISON_PRODUCTS
            ),
        }
    }
}

pub fn product_card(product: &Product, compare: CompareButton) -> Element<'_, Message> {
    let features = product
        .features
        .iter()
        .take(FEATURE_PREVIEW)
        .fold(Column::new().spacing(2), |col, feature| {
            col.push(text(format!("• {}", feature)).size(12))
        });

    let more = product.features.len().saturating_sub(FEATURE_PREVIEW);
    let features = if more > 0 {
        features.push(text(format!("+{} more", more)).size(12))
    } else {
        features
    };

    let action = match compare {
        CompareButton::Remove => button(text(compare.label()))
            .on_press(Message::RemoveFromCompare(product.id))
            .style(button::danger),
        CompareButton::Add => button(text(compare.label()))
            .on_press(Message::AddToCompare(product.id))
            .style(button::primary),
        CompareButton::Disabled => button(text(compare.label())).style(button::secondary),
    };

    let content = column![
        text(&product.name).size(18),
        row![
            text(&product.brand).size(13),
            iced::widget::horizontal_space(),
            text(format_price(product.price)).size(16),
        ],
        features,
        action.width(Length::Fill).padding(8),
    ]
    .spacing(10);

    container(content)
        .padding(14)
        .width(Length::Fixed(CARD_WIDTH))
        .style(container::rounded_box)
        .into()
}
