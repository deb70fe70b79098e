//! Application state managed via Dioxus context.
//!
//! `AppState` bundles the reactive signals the views read. The orchestrator
//! owns the real state; `AppState::mirror` copies each published snapshot
//! into the signals, so views never mutate dashboard data themselves.

use dioxus::prelude::*;
use mill_api::http::HttpDataSource;
use mill_api::{CategoryKey, DataMode};
use mill_data::chart::ChartDataset;
use mill_data::summary::Summary;
use mill_data::CategoryResultSet;
use mill_drill::{DashboardSnapshot, DrillConfig, DrillState, LoadingFlags, Orchestrator, Phase, Selection};
use std::rc::Rc;

use crate::credentials::LocalStorageCredentials;

/// The orchestrator as the web dashboard runs it.
pub type Dashboard = Orchestrator<HttpDataSource<LocalStorageCredentials>>;

/// Shared handle to the dashboard orchestrator, provided via context.
#[derive(Clone)]
pub struct DashboardHandle(pub Rc<Dashboard>);

impl PartialEq for DashboardHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for DashboardHandle {
    type Target = Dashboard;

    fn deref(&self) -> &Dashboard {
        &self.0
    }
}

/// Shared application state for the mill dashboard.
#[derive(Clone, Copy)]
pub struct AppState {
    /// Current drill-down phase
    pub phase: Signal<Phase>,
    /// Active data source tab
    pub mode: Signal<DataMode>,
    /// Selected year, month and focused breakdown
    pub selection: Signal<Selection>,
    /// Which lists are being fetched
    pub loading: Signal<LoadingFlags>,
    /// Year totals chart
    pub year_chart: Signal<ChartDataset>,
    /// Month totals chart for the selected year
    pub month_chart: Signal<ChartDataset>,
    /// Breakdown rows for all six categories
    pub categories: Signal<CategoryResultSet>,
    /// KPI tiles
    pub summary: Signal<Summary>,
}

impl AppState {
    /// Create a new AppState showing an idle dashboard.
    pub fn new() -> Self {
        let idle = DrillState::new(DataMode::default(), DrillConfig::default().default_category).snapshot();
        Self {
            phase: Signal::new(idle.phase),
            mode: Signal::new(idle.mode),
            selection: Signal::new(idle.selection),
            loading: Signal::new(idle.loading),
            year_chart: Signal::new(idle.year_chart),
            month_chart: Signal::new(idle.month_chart),
            categories: Signal::new(idle.categories),
            summary: Signal::new(idle.summary),
        }
    }

    /// Copy a published snapshot into the signals. Unchanged values are not
    /// written, so views only re-render for what moved.
    pub fn mirror(&mut self, snapshot: &DashboardSnapshot) {
        set_if_changed(&mut self.phase, snapshot.phase);
        set_if_changed(&mut self.mode, snapshot.mode);
        set_if_changed(&mut self.selection, snapshot.selection);
        set_if_changed(&mut self.loading, snapshot.loading);
        set_if_changed(&mut self.year_chart, snapshot.year_chart.clone());
        set_if_changed(&mut self.month_chart, snapshot.month_chart.clone());
        set_if_changed(&mut self.categories, snapshot.categories.clone());
        set_if_changed(&mut self.summary, snapshot.summary.clone());
    }

    /// The focused breakdown.
    pub fn focus(&self) -> CategoryKey {
        self.selection.read().category
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn set_if_changed<T: PartialEq + 'static>(signal: &mut Signal<T>, value: T) {
    if *signal.peek() != value {
        signal.set(value);
    }
}
