//! `drill`: load the dashboard the way the web view does and print it.

use crate::DrillArgs;
use anyhow::bail;
use log::info;
use mill_api::config::ApiConfig;
use mill_api::http::HttpDataSource;
use mill_api::{CategoryKey, StaticCredentials};
use mill_drill::{DashboardSnapshot, DrillConfig, Orchestrator, Phase};
use mill_utils::numbers::format_thousands;
use std::fmt::Write as _;

/// Run Initialize, then the requested year/month selections and focus.
///
/// Fails only when the backend rejected the credential; an empty backend
/// yields a `NoData` snapshot.
pub async fn load_snapshot(
    config: ApiConfig,
    target: &DrillArgs,
    focus: CategoryKey,
) -> anyhow::Result<DashboardSnapshot> {
    let credentials = StaticCredentials::new(config.token.clone());
    info!("Loading {} data from {}", target.mode, config.base_url);
    let source = HttpDataSource::new(config, credentials)?;
    let orchestrator = Orchestrator::new(source, target.mode, DrillConfig::default());

    orchestrator.initialize().await;
    if let Some(year) = target.year {
        if orchestrator.snapshot().selection.year != Some(year) {
            orchestrator.select_year(year).await;
        }
    }
    if let Some(month) = target.month {
        if orchestrator.snapshot().selection.month != Some(month) {
            orchestrator.select_month(month).await;
        }
    }
    orchestrator.focus_category(focus);

    let snapshot = orchestrator.snapshot();
    if snapshot.phase == Phase::SignedOut {
        bail!("the backend rejected the credential; set MILL_API_TOKEN or pass --token");
    }
    Ok(snapshot)
}

pub async fn run_drill(
    config: ApiConfig,
    target: &DrillArgs,
    category: CategoryKey,
    json: bool,
) -> anyhow::Result<()> {
    let snapshot = load_snapshot(config, target, category).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_report(&snapshot));
    }
    Ok(())
}

/// Plain-text report of a snapshot.
pub fn render_report(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let mode = snapshot.mode.title();

    if snapshot.phase == Phase::NoData {
        let _ = writeln!(out, "No {} data available.", mode.to_lowercase());
        return out;
    }

    let _ = writeln!(out, "== KPIs ==");
    for figure in &snapshot.summary.figures {
        let value = figure
            .value
            .map(format_thousands)
            .unwrap_or_else(|| mill_data::summary::MISSING.to_string());
        let _ = writeln!(out, "{:<18} {:>14}  {}", figure.title, value, figure.period_label);
    }

    let _ = writeln!(out, "\n== {} ==", snapshot.year_chart.title);
    for point in &snapshot.year_chart.points {
        let selected = snapshot.selection.year.map(|y| y.to_string()).as_deref() == Some(point.name.as_str());
        let _ = writeln!(out, "{} {:<10} {:>14}", marker(selected), point.name, format_thousands(point.value));
    }

    let _ = writeln!(out, "\n== {} ==", snapshot.month_chart.title);
    if snapshot.month_chart.is_empty() {
        let _ = writeln!(out, "  (no months)");
    }
    for point in &snapshot.month_chart.points {
        let selected = point.month_number.is_some() && point.month_number == snapshot.selection.month;
        let _ = writeln!(out, "{} {:<10} {:>14}", marker(selected), point.name, format_thousands(point.value));
    }

    let key = snapshot.selection.category;
    let rows = snapshot.categories.get(key);
    let _ = writeln!(out, "\n== {} Wise {} ==", key.title(), mode);
    if let Some(failure) = snapshot.categories.failure(key) {
        let _ = writeln!(out, "  (fetch failed: {failure:?})");
    } else if rows.is_empty() {
        let _ = writeln!(out, "  (no rows)");
    }
    for row in rows {
        let _ = writeln!(out, "  {:<30} {:>14}", row.label, format_thousands(row.value));
    }
    out
}

fn marker(selected: bool) -> char {
    if selected {
        '*'
    } else {
        ' '
    }
}
