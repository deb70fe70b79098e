//! Section heading for a chart: title, the current pick as a badge, and a hint.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ChartHeaderProps {
    pub title: String,
    /// What the chart currently has selected ("2024", "May 2024"); hidden when empty
    #[props(default = String::new())]
    pub badge: String,
    /// How to interact with the chart
    #[props(default = String::new())]
    pub hint: String,
}

#[component]
pub fn ChartHeader(props: ChartHeaderProps) -> Element {
    rsx! {
        div {
            style: "display: flex; flex-wrap: wrap; align-items: baseline; gap: 8px; margin-bottom: 8px;",
            h3 { style: "margin: 0; font-size: 16px;", "{props.title}" }
            if !props.badge.is_empty() {
                span {
                    style: "padding: 1px 8px; border-radius: 10px; background: #E3F2FD; color: #0D47A1; font-size: 12px;",
                    "{props.badge}"
                }
            }
            if !props.hint.is_empty() {
                span { style: "flex-basis: 100%; font-size: 12px; color: #666;", "{props.hint}" }
            }
        }
    }
}
