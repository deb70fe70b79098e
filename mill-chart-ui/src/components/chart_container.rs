//! Chart container: the D3 mount point plus loading and empty overlays.

use crate::components::EmptyState;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ChartContainerProps {
    /// DOM id D3 renders into
    pub id: String,
    /// A fetch for this chart is in flight
    #[props(default = false)]
    pub loading: bool,
    /// Shown over the chart when non-empty and not loading
    #[props(default = String::new())]
    pub empty_message: String,
    #[props(default = 360)]
    pub min_height: u32,
}

/// The mount div stays in the DOM even while empty, so a render queued by an
/// effect always finds its container.
#[component]
pub fn ChartContainer(props: ChartContainerProps) -> Element {
    let style = format!("min-height: {}px; position: relative; width: 100%;", props.min_height);
    let show_empty = !props.loading && !props.empty_message.is_empty();

    rsx! {
        div {
            style: "{style}",
            if props.loading {
                div {
                    style: "position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; color: #666; background: rgba(255, 255, 255, 0.6);",
                    "Loading..."
                }
            }
            if show_empty {
                EmptyState { message: props.empty_message.clone() }
            }
            div { id: "{props.id}", style: "width: 100%;" }
        }
    }
}
