//! Start-up failure panel.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ErrorDisplayProps {
    pub message: String,
}

/// Shown only when the dashboard cannot be built at all (bad backend URL).
/// Fetch failures never reach here; they surface as empty lists.
#[component]
pub fn ErrorDisplay(props: ErrorDisplayProps) -> Element {
    rsx! {
        div {
            style: "padding: 12px 16px; margin: 8px 0; background: #FFEBEE; color: #C62828; border-radius: 4px; border: 1px solid #EF9A9A;",
            strong { "Dashboard unavailable" }
            p { style: "margin: 4px 0 0 0;", "{props.message}" }
            p {
                style: "margin: 4px 0 0 0; font-size: 12px; color: #8E2424;",
                "Rebuild with MILL_API_BASE_URL set to the backend address."
            }
        }
    }
}
