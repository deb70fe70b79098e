//! Reusable Dioxus RSX components for the mill dashboard.

mod category_tabs;
mod chart_container;
mod chart_header;
mod empty_state;
mod error_display;
mod kpi_tiles;
mod loading_spinner;
mod mode_tabs;

pub use category_tabs::CategoryTabs;
pub use chart_container::ChartContainer;
pub use chart_header::ChartHeader;
pub use empty_state::EmptyState;
pub use error_display::ErrorDisplay;
pub use kpi_tiles::KpiTiles;
pub use loading_spinner::LoadingSpinner;
pub use mode_tabs::ModeTabs;
