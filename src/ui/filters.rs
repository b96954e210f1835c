/// Search box, brand picker and the active-filter summary
use iced::widget::{button, column, pick_list, row, text, text_input};
use iced::{Alignment, Element, Length};
use std::fmt;

use crate::state::filter::FilterState;
use crate::Message;

/// Entry in the brand picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandChoice {
    All,
    Brand(String),
}

impl BrandChoice {
    /// The brand filter this choice stands for; empty means all brands
    pub fn brand(&self) -> &str {
        match self {
            BrandChoice::All => "",
            BrandChoice::Brand(brand) => brand,
        }
    }

    fn from_selected(selected: &str) -> Self {
        if selected.is_empty() {
            BrandChoice::All
        } else {
            BrandChoice::Brand(selected.to_string())
        }
    }
}

impl fmt::Display for BrandChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrandChoice::All => write!(f, "All Brands"),
            BrandChoice::Brand(brand) => write!(f, "{}", brand),
        }
    }
}

/// "All Brands" followed by every catalog brand
pub fn brand_choices(brands: &[String]) -> Vec<BrandChoice> {
    std::iter::once(BrandChoice::All)
        .chain(brands.iter().cloned().map(BrandChoice::Brand))
        .collect()
}

/// Summary line under the inputs, e.g. `Showing 2 of 8 products`
pub fn results_summary(shown: usize, total: usize) -> String {
    if shown == total {
        format!("Showing all {} products", total)
    } else {
        format!("Showing {} of {} products", shown, total)
    }
}

pub fn filter_bar<'a>(
    filters: &'a FilterState,
    brands: &[String],
    shown: usize,
    total: usize,
) -> Element<'a, Message> {
    let search = text_input("Search products, brands, or features...", &filters.search_term)
        .on_input(Message::SearchChanged)
        .padding(10)
        .width(Length::Fill);

    let brand = pick_list(
        brand_choices(brands),
        Some(BrandChoice::from_selected(&filters.selected_brand)),
        Message::BrandSelected,
    )
    .padding(10)
    .width(Length::Fixed(200.0));

    let clear = button("Clear Filters")
        .on_press_maybe(filters.is_active().then_some(Message::ClearFilters))
        .style(button::secondary)
        .padding(10);

    let mut status = row![text(results_summary(shown, total)).size(13)].spacing(12);
    if !filters.search_term.is_empty() {
        status = status.push(text(format!("Search: \"{}\"", filters.search_term)).size(13));
    }
    if !filters.selected_brand.is_empty() {
        status = status.push(text(format!("Brand: {}", filters.selected_brand)).size(13));
    }

    column![
        row![search, brand, clear]
            .spacing(12)
            .align_y(Alignment::Center),
        status,
    ]
    .spacing(8)
    .into()
}
