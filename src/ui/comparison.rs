/// Side-by-side comparison table
use iced::widget::{button, column, container, row, text, Column, Row};
use iced::{Color, Element, Length};
use std::collections::BTreeSet;

use crate::state::data::Product;
use crate::Message;

/// Shown where a product lacks a specification the others have
const MISSING_SPEC: &str = "N/A";

/// Highlight for rows whose values differ between products
const DIFFERS_COLOR: Color = Color::from_rgb(0.95, 0.6, 0.1);

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRow {
    pub label: String,
    /// One value per product, in selection order
    pub values: Vec<String>,
    /// True when not every product has the same value
    pub differs: bool,
}

impl SpecRow {
    fn new(label: impl Into<String>, values: Vec<String>) -> Self {
        let differs = values.windows(2).any(|pair| pair[0] != pair[1]);
        Self {
            label: label.into(),
            values,
            differs,
        }
    }
}

/// Build the table rows: price first, then the union of every product's
/// spec keys. Missing values show as "N/A".
pub fn spec_rows(products: &[Product]) -> Vec<SpecRow> {
    let mut rows = vec![SpecRow::new(
        "Price",
        products.iter().map(|p| format_price(p.price)).collect(),
    )];

    let names: BTreeSet<&str> = products
        .iter()
        .flat_map(|p| p.specs.keys().map(String::as_str))
        .collect();

    for name in names {
        let values = products
            .iter()
            .map(|p| p.spec(name).unwrap_or(MISSING_SPEC).to_string())
            .collect();
        rows.push(SpecRow::new(spec_label(name), values));
    }

    rows
}

/// "battery" -> "Battery", "screenSize" -> "Screen Size"
fn spec_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    let mut chars = name.chars();

    if let Some(first) = chars.next() {
        label.extend(first.to_uppercase());
    }
    for c in chars {
        if c.is_uppercase() {
            label.push(' ');
        }
        label.push(c);
    }

    label
}

/// Format a price with the rupee sign and thousands separators
pub fn format_price(price: f64) -> String {
    let cents = (price * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction == 0 {
        format!("₹{}", grouped)
    } else {
        format!("₹{}.{:02}", grouped, fraction)
    }
}

/// The comparison panel: product headers with remove buttons, then one
/// row per specification
pub fn panel<'a>(products: &'a [Product]) -> Element<'a, Message> {
    let header = products.iter().fold(
        Row::new()
            .spacing(12)
            .push(text("Specification").size(16).width(Length::FillPortion(1))),
        |header, product| {
            header.push(
                column![
                    text(&product.name).size(16),
                    text(&product.brand).size(12),
                    button("Remove")
                        .on_press(Message::RemoveFromCompare(product.id))
                        .style(button::secondary)
                        .padding([4, 8]),
                ]
                .spacing(4)
                .width(Length::FillPortion(1)),
            )
        },
    );

    let rows = spec_rows(products).into_iter().map(|spec| -> Element<'a, Message> {
        let label = text(spec.label).size(14).width(Length::FillPortion(1));
        let label = if spec.differs {
            label.color(DIFFERS_COLOR)
        } else {
            label
        };

        spec.values
            .into_iter()
            .fold(Row::new().spacing(12).push(label), |row, value| {
                row.push(text(value).size(14).width(Length::FillPortion(1)))
            })
            .into()
    });

    let table = Column::with_children(rows).spacing(8);

    let title = row![
        text("Product Comparison").size(22),
        iced::widget::horizontal_space(),
        button("Clear All")
            .on_press(Message::ClearComparison)
            .style(button::secondary),
    ];

    container(column![title, header, table].spacing(16))
        .padding(16)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}
