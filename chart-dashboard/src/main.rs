//! Production/Stock Drill-Down Dashboard
//!
//! Shows yearly totals, the months of the selected year and six breakdowns
//! (book, beam, item, selvage, factory, customer) for the selected month.
//!
//! Data flow:
//! 1. The orchestrator loads tiles, years, months and breakdowns from the
//!    backend and publishes a snapshot after every step.
//! 2. Each snapshot is mirrored into `AppState` signals.
//! 3. Effects re-render the D3 charts whenever their signal changes.
//! 4. Clicks on the year and month charts come back through the JS bridge,
//!    are decoded into a year or month, and become orchestrator transitions.

use dioxus::prelude::*;
use futures::channel::mpsc;
use futures::StreamExt;
use mill_api::config::{ApiConfig, BASE_URL_VAR};
use mill_api::http::HttpDataSource;
use mill_api::{CategoryKey, DataMode};
use mill_chart_ui::components::{
    CategoryTabs, ChartContainer, ChartHeader, EmptyState, ErrorDisplay, KpiTiles, LoadingSpinner, ModeTabs,
};
use mill_chart_ui::credentials::LocalStorageCredentials;
use mill_chart_ui::js_bridge;
use mill_chart_ui::state::{AppState, DashboardHandle};
use mill_data::chart::{
    category_dataset, category_mini_bar, category_pie, decode_month_click, decode_year_click, ChartClick,
    ChartDataset,
};
use mill_data::summary::Period;
use mill_drill::{DrillConfig, Orchestrator, Phase};
use std::rc::Rc;

/// Chart container DOM element IDs used by D3.js to render into.
const YEAR_CHART_ID: &str = "year-chart";
const MONTH_CHART_ID: &str = "month-chart";
const CATEGORY_CHART_ID: &str = "category-chart";
const SHARE_CHART_ID: &str = "category-share-chart";

/// Backend base URL baked in at build time; falls back to the page origin.
const BUILD_BASE_URL: Option<&str> = option_env!("MILL_API_BASE_URL");

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("dashboard-root"))
        .launch(App);
}

fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

fn build_dashboard() -> anyhow::Result<DashboardHandle> {
    let base_url = BUILD_BASE_URL
        .map(str::to_string)
        .or_else(page_origin)
        .ok_or_else(|| anyhow::anyhow!("{BASE_URL_VAR} was not set at build time and the page has no origin"))?;
    let config = ApiConfig::new(&base_url)?;
    log::info!("[Mill] Dashboard backend: {}", config.base_url);
    let source = HttpDataSource::new(config, LocalStorageCredentials)?;
    let orchestrator = Orchestrator::new(source, DataMode::Production, DrillConfig::default());
    Ok(DashboardHandle(Rc::new(orchestrator)))
}

fn mini_chart_id(key: CategoryKey) -> String {
    format!("mini-{}", key.as_str())
}

fn render_or_clear(container_id: &str, dataset: &ChartDataset, config: serde_json::Value) {
    if dataset.is_empty() {
        js_bridge::destroy_chart(container_id);
    } else {
        js_bridge::render_chart(container_id, dataset, &config.to_string());
    }
}

fn empty_note(empty: bool, message: &str) -> String {
    if empty {
        message.to_string()
    } else {
        String::new()
    }
}

#[component]
fn App() -> Element {
    let built = use_hook(|| build_dashboard().map_err(|e| e.to_string()));

    match built {
        Ok(handle) => rsx! { Dashboard { handle } },
        Err(message) => {
            log::error!("[Mill] Dashboard failed to start: {}", message);
            rsx! { ErrorDisplay { message } }
        }
    }
}

#[component]
fn Dashboard(handle: DashboardHandle) -> Element {
    let state = use_context_provider(AppState::new);
    use_context_provider(|| handle.clone());

    // Mirror snapshots, route chart clicks, then start loading.
    use_hook(|| {
        handle.subscribe(move |snapshot| {
            let mut state = state;
            state.mirror(snapshot);
        });

        js_bridge::init_charts();

        let (clicks_tx, mut clicks_rx) = mpsc::unbounded::<(String, ChartClick)>();
        js_bridge::on_chart_click(move |container_id, click| {
            let _ = clicks_tx.unbounded_send((container_id, click));
        });
        let router = handle.clone();
        spawn(async move {
            while let Some((container_id, click)) = clicks_rx.next().await {
                route_click(&router, &container_id, &click);
            }
        });

        let loader = handle.clone();
        spawn(async move { loader.initialize().await });
    });

    use_effect(move || {
        let dataset = state.year_chart.read();
        render_or_clear(
            YEAR_CHART_ID,
            &dataset,
            serde_json::json!({ "clickable": true, "color": "#1976D2" }),
        );
    });

    use_effect(move || {
        let dataset = state.month_chart.read();
        let selected = state.selection.read().month;
        let selected_label = dataset
            .points
            .iter()
            .find(|point| point.month_number.is_some() && point.month_number == selected)
            .map(|point| point.name.clone());
        render_or_clear(
            MONTH_CHART_ID,
            &dataset,
            serde_json::json!({ "color": "#388E3C", "selected": selected_label }),
        );
    });

    use_effect(move || {
        let categories = state.categories.read();
        let focus = state.selection.read().category;
        let mode = (state.mode)();

        let rows = categories.get(focus);
        render_or_clear(
            CATEGORY_CHART_ID,
            &category_dataset(focus, rows, mode.title()),
            serde_json::json!({ "color": "#455A64" }),
        );
        render_or_clear(SHARE_CHART_ID, &category_pie(focus, rows), serde_json::json!({}));
        for (key, rows) in categories.iter() {
            render_or_clear(
                &mini_chart_id(key),
                &category_mini_bar(key, rows),
                serde_json::json!({ "height": 160 }),
            );
        }
    });

    let phase = (state.phase)();
    let mode = (state.mode)();
    let loading = (state.loading)();
    let selection = (state.selection)();
    let year_badge = selection.year.map(|year| year.to_string()).unwrap_or_default();
    let month_badge = match (selection.year, selection.month) {
        (Some(year), Some(month)) => Period::Month { year, month }.label(),
        (Some(year), None) => format!("All of {year}"),
        _ => String::new(),
    };
    let year_empty = empty_note(state.year_chart.read().is_empty(), "No years to show");
    let month_empty = empty_note(state.month_chart.read().is_empty(), "No months for this year");
    let category_empty = empty_note(
        state.categories.read().get(state.focus()).is_empty(),
        "No rows for this breakdown",
    );

    let body = match phase {
        Phase::Idle | Phase::LoadingTiles => rsx! { LoadingSpinner { label: "Loading tiles...".to_string() } },
        Phase::LoadingYears => rsx! { LoadingSpinner { label: format!("Loading {} years...", mode.as_str()) } },
        Phase::NoData => rsx! {
            EmptyState { message: format!("No {} data available.", mode.as_str()) }
        },
        Phase::SignedOut => rsx! {
            EmptyState { message: "Your session has ended. Redirecting to sign in...".to_string() }
        },
        Phase::LoadingMonths | Phase::LoadingCategories | Phase::Ready => rsx! {
            KpiTiles {}

            div {
                style: "display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 16px;",
                div {
                    ChartHeader {
                        title: state.year_chart.read().title.clone(),
                        badge: year_badge,
                        hint: "Click a bar to drill into that year".to_string(),
                    }
                    ChartContainer { id: YEAR_CHART_ID.to_string(), loading: loading.years, empty_message: year_empty }
                }
                div {
                    ChartHeader {
                        title: state.month_chart.read().title.clone(),
                        badge: month_badge,
                        hint: "Click a point to load that month's breakdowns".to_string(),
                    }
                    ChartContainer { id: MONTH_CHART_ID.to_string(), loading: loading.months, empty_message: month_empty }
                }
            }

            CategoryTabs {}

            div {
                style: "display: grid; grid-template-columns: 2fr 1fr; gap: 16px;",
                ChartContainer { id: CATEGORY_CHART_ID.to_string(), loading: loading.categories, empty_message: category_empty, min_height: 420 }
                ChartContainer { id: SHARE_CHART_ID.to_string(), loading: loading.categories, min_height: 320 }
            }

            div {
                style: "display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 12px; margin-top: 16px;",
                for key in CategoryKey::ALL {
                    div {
                        key: "{key}",
                        ChartHeader { title: key.title().to_string() }
                        ChartContainer { id: mini_chart_id(key), loading: loading.categories, min_height: 160 }
                    }
                }
            }
        },
    };

    rsx! {
        div {
            style: "padding: 16px; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;",
            ChartHeader { title: "Production / Stock Dashboard".to_string() }
            ModeTabs {}
            {body}
        }
    }
}

/// Turn a decoded chart click into a transition. Each transition runs as its
/// own task so a newer click can overtake an older one.
fn route_click(dashboard: &DashboardHandle, container_id: &str, click: &ChartClick) {
    match container_id {
        YEAR_CHART_ID => {
            if let Some(year) = decode_year_click(click) {
                let dashboard = dashboard.clone();
                spawn(async move { dashboard.select_year(year).await });
            }
        }
        MONTH_CHART_ID => {
            if let Some(month) = decode_month_click(click) {
                let dashboard = dashboard.clone();
                spawn(async move { dashboard.select_month(month).await });
            }
        }
        other => log::debug!("[Mill] Ignoring click on {}", other),
    }
}
