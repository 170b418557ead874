//! Medallion Report — price chart rendering for the gold layer.
//!
//! The chart is a ratatui `Chart` widget drawn into an offscreen buffer and
//! saved as plain text, so reports need neither a terminal nor an image
//! backend.

pub mod chart;
pub mod dashboard;
pub mod render;

pub use chart::{PriceChart, PricePoint};
pub use dashboard::{
    extract_series, render_dashboard, PriceSeries, ReportError, ReportOptions, REPORT_FILE,
};
pub use render::{buffer_text, render_to_text};
