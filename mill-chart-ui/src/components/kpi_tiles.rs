//! KPI tile row.

use crate::state::AppState;
use dioxus::prelude::*;
use mill_data::summary::{SummarySource, MISSING};
use mill_utils::numbers::format_thousands;

/// The four KPI figures, with a note when they come from breakdown rows
/// instead of the tiles endpoint.
#[component]
pub fn KpiTiles() -> Element {
    let state = use_context::<AppState>();
    let summary = state.summary.read();

    let note = match summary.source {
        SummarySource::Tiles => None,
        SummarySource::CategoryRows { category, period } => Some(format!(
            "Tiles unavailable; showing the {} breakdown total for {}",
            category.title(),
            period.label()
        )),
        SummarySource::Unavailable => Some("Tiles unavailable".to_string()),
    };

    rsx! {
        div {
            style: "display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; margin-bottom: 8px;",
            for figure in summary.figures.iter() {
                div {
                    key: "{figure.title}",
                    style: "padding: 12px; border: 1px solid #E0E0E0; border-radius: 6px; background: #fff;",
                    div { style: "font-size: 12px; color: #666;", "{figure.title}" }
                    div {
                        style: "font-size: 22px; font-weight: bold; margin: 4px 0;",
                        {figure.value.map(format_thousands).unwrap_or_else(|| MISSING.to_string())}
                    }
                    div { style: "font-size: 12px; color: #999;", "{figure.period_label}" }
                }
            }
        }
        if let Some(note) = note {
            p { style: "margin: 0 0 12px 0; font-size: 12px; color: #999;", "{note}" }
        }
    }
}
