//! Price chart widget: closing price over time for one symbol.
//!
//! Displays:
//! - Price line (x = trading day, y = price)
//! - First/middle/last dates on the x axis
//! - Low/middle/high prices on the y axis
//! - "No Data" when there is nothing to plot

use chrono::NaiveDate;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

/// One plotted observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Line chart of a price series.
pub struct PriceChart<'a> {
    points: &'a [PricePoint],
    symbol: &'a str,
    date_column: &'a str,
}

impl<'a> PriceChart<'a> {
    pub fn new(points: &'a [PricePoint], symbol: &'a str, date_column: &'a str) -> Self {
        Self {
            points,
            symbol,
            date_column,
        }
    }

    /// Chart title; the date column name is shown with a leading capital.
    pub fn title(&self) -> String {
        let mut chars = self.date_column.chars();
        let column: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!(" {} Price Movement (via {column}) ", self.symbol)
    }

    /// Y bounds with 5% padding; flat series get a fixed band.
    fn y_bounds(&self) -> (f64, f64) {
        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.price), hi.max(p.price))
            });
        let range = max - min;
        let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
        (min - pad, max + pad)
    }
}

impl<'a> Widget for PriceChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            Paragraph::new("No Data")
                .alignment(Alignment::Center)
                .block(block)
                .render(area, buf);
            return;
        };

        let data: Vec<(f64, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.price))
            .collect();

        let x_max = (self.points.len() - 1).max(1) as f64;
        let (y_lower, y_upper) = self.y_bounds();
        let y_mid = (y_lower + y_upper) / 2.0;
        let middle = self.points[(self.points.len() - 1) / 2];

        let x_labels = vec![
            Span::raw(first.date.format("%Y-%m-%d").to_string()),
            Span::raw(middle.date.format("%Y-%m-%d").to_string()),
            Span::raw(last.date.format("%Y-%m-%d").to_string()),
        ];
        let y_labels = vec![
            Span::raw(format!("${y_lower:.2}")),
            Span::raw(format!("${y_mid:.2}")),
            Span::raw(format!("${y_upper:.2}")),
        ];

        let datasets = vec![Dataset::default()
            .name(self.symbol.to_string())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&data)];

        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Date")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title("Price (USD)")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}
