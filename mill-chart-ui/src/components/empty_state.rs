//! Empty-list message.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct EmptyStateProps {
    pub message: String,
}

#[component]
pub fn EmptyState(props: EmptyStateProps) -> Element {
    rsx! {
        div {
            style: "padding: 24px; text-align: center; color: #888; background: #FAFAFA; border: 1px dashed #E0E0E0; border-radius: 4px;",
            "{props.message}"
        }
    }
}
