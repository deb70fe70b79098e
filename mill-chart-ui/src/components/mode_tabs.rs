//! Production / stock tab switcher.

use crate::state::{AppState, DashboardHandle};
use dioxus::prelude::*;
use mill_api::DataMode;

/// Tabs for the data source plus a refresh button. Switching resets the
/// drill-down and reloads; refresh reloads the current source.
#[component]
pub fn ModeTabs() -> Element {
    let state = use_context::<AppState>();
    let dashboard = use_context::<DashboardHandle>();
    let current = (state.mode)();
    let busy = (state.phase)().is_loading();

    rsx! {
        div {
            style: "display: flex; gap: 4px; margin-bottom: 12px;",
            for mode in DataMode::ALL {
                button {
                    key: "{mode}",
                    style: tab_style(mode == current),
                    onclick: {
                        let dashboard = dashboard.clone();
                        move |_| {
                            if mode != current {
                                let dashboard = dashboard.clone();
                                spawn(async move { dashboard.switch_mode(mode).await });
                            }
                        }
                    },
                    {mode.title()}
                }
            }
            button {
                style: "margin-left: auto; padding: 6px 12px; border: 1px solid #BDBDBD; border-radius: 4px; background: #fff; cursor: pointer;",
                disabled: busy,
                onclick: {
                    let dashboard = dashboard.clone();
                    move |_| {
                        let dashboard = dashboard.clone();
                        spawn(async move { dashboard.refresh().await });
                    }
                },
                "Refresh"
            }
        }
    }
}

fn tab_style(active: bool) -> &'static str {
    if active {
        "padding: 6px 16px; border: none; border-radius: 4px; background: #1976D2; color: #fff; font-weight: bold;"
    } else {
        "padding: 6px 16px; border: 1px solid #BDBDBD; border-radius: 4px; background: #fff; color: #333; cursor: pointer;"
    }
}
