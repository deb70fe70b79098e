//! Breakdown focus selector.

use crate::state::{AppState, DashboardHandle};
use dioxus::prelude::*;
use mill_api::CategoryKey;

/// One button per breakdown category; the focused one drives the detail
/// chart and the KPI fallback.
#[component]
pub fn CategoryTabs() -> Element {
    let state = use_context::<AppState>();
    let dashboard = use_context::<DashboardHandle>();
    let focused = state.focus();
    let tabs: Vec<(CategoryKey, String)> = {
        let categories = state.categories.read();
        CategoryKey::ALL
            .into_iter()
            .map(|key| (key, format!("{} ({})", key.title(), categories.get(key).len())))
            .collect()
    };

    rsx! {
        div {
            style: "display: flex; flex-wrap: wrap; gap: 4px; margin: 8px 0;",
            for (key, label) in tabs {
                button {
                    key: "{key}",
                    style: tab_style(key == focused),
                    onclick: {
                        let dashboard = dashboard.clone();
                        move |_| dashboard.focus_category(key)
                    },
                    "{label}"
                }
            }
        }
    }
}

fn tab_style(active: bool) -> &'static str {
    if active {
        "padding: 4px 12px; border: none; border-radius: 12px; background: #455A64; color: #fff;"
    } else {
        "padding: 4px 12px; border: 1px solid #CFD8DC; border-radius: 12px; background: #fff; cursor: pointer;"
    }
}
