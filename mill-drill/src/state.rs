//! Dashboard state and its transitions.
//!
//! `DrillState` is plain data. Every mutation the orchestrator performs goes
//! through one of the methods here, which keep the selection consistent with
//! the lists it was derived from. None of them fetch; fetching and fencing
//! live in the orchestrator.

use mill_api::{CategoryKey, DataMode, RawRow};
use mill_data::chart::{month_dataset, year_dataset, ChartDataset};
use mill_data::records::{latest_month, latest_year, month_records, year_records};
use mill_data::summary::{derive_summary, Summary, SummaryInput};
use mill_data::{CategoryResultSet, MonthRecord, Tiles, YearRecord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    LoadingTiles,
    LoadingYears,
    LoadingMonths,
    LoadingCategories,
    Ready,
    /// The year list came back empty.
    NoData,
    /// An authorization failure stopped the load chain.
    SignedOut,
}

impl Phase {
    /// A step of the load chain is still running.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Phase::LoadingTiles | Phase::LoadingYears | Phase::LoadingMonths | Phase::LoadingCategories
        )
    }
}

/// What the user is looking at. `month = None` is the whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub category: CategoryKey,
}

impl Selection {
    pub fn new(category: CategoryKey) -> Self {
        Self {
            year: None,
            month: None,
            category,
        }
    }
}

/// Which lists have a fetch in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoadingFlags {
    pub tiles: bool,
    pub years: bool,
    pub months: bool,
    pub categories: bool,
}

impl LoadingFlags {
    pub fn any(&self) -> bool {
        self.tiles || self.years || self.months || self.categories
    }
}

#[derive(Debug, Clone)]
pub struct DrillState {
    pub mode: DataMode,
    pub phase: Phase,
    pub selection: Selection,
    pub years: Vec<YearRecord>,
    pub months: Vec<MonthRecord>,
    pub categories: CategoryResultSet,
    pub tiles: Option<Tiles>,
    pub loading: LoadingFlags,
    default_category: CategoryKey,
}

impl DrillState {
    pub fn new(mode: DataMode, default_category: CategoryKey) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
            selection: Selection::new(default_category),
            years: Vec::new(),
            months: Vec::new(),
            categories: CategoryResultSet::empty(),
            tiles: None,
            loading: LoadingFlags::default(),
            default_category,
        }
    }

    /// Drop everything loaded for the current mode and start the tiles fetch.
    pub fn begin_initialize(&mut self) {
        *self = Self::new(self.mode, self.default_category);
        self.phase = Phase::LoadingTiles;
        self.loading.tiles = true;
    }

    pub fn switch_mode(&mut self, mode: DataMode) {
        self.mode = mode;
        self.begin_initialize();
    }

    /// A rejected credential stops every later step until the next
    /// initialize or mode switch.
    pub fn is_signed_out(&self) -> bool {
        self.phase == Phase::SignedOut
    }

    pub fn apply_tiles(&mut self, raw: Option<RawRow>) {
        if self.is_signed_out() {
            return;
        }
        self.tiles = raw.as_ref().and_then(Tiles::from_raw);
        self.loading.tiles = false;
        self.phase = Phase::LoadingYears;
        self.loading.years = true;
    }

    /// Store the year list and select the latest year. Returns the selected
    /// year, or `None` when there is nothing to drill into.
    pub fn apply_years(&mut self, rows: &[RawRow]) -> Option<i32> {
        if self.is_signed_out() {
            return None;
        }
        self.years = year_records(rows);
        self.loading.years = false;
        match latest_year(&self.years) {
            Some(year) => {
                self.begin_year(year);
                Some(year)
            }
            None => {
                self.phase = Phase::NoData;
                None
            }
        }
    }

    /// Select `year`, clearing the month and everything derived from it.
    pub fn begin_year(&mut self, year: i32) {
        if self.is_signed_out() {
            return;
        }
        self.selection.year = Some(year);
        self.selection.month = None;
        self.months.clear();
        self.categories = CategoryResultSet::empty();
        self.phase = Phase::LoadingMonths;
        self.loading.months = true;
        self.loading.categories = false;
    }

    pub fn apply_months(&mut self, rows: &[RawRow]) {
        if self.is_signed_out() {
            return;
        }
        self.months = month_records(rows);
        self.loading.months = false;
    }

    /// Select the latest parseable month, or the whole year if there is none.
    pub fn pick_latest_month(&mut self) -> Option<u32> {
        self.selection.month = latest_month(&self.months);
        self.selection.month
    }

    /// Select `month` of the selected year. Rejected unless a year is
    /// selected and `month` is a calendar month.
    pub fn select_month(&mut self, month: u32) -> bool {
        if self.is_signed_out() || self.selection.year.is_none() || !(1..=12).contains(&month) {
            return false;
        }
        self.selection.month = Some(month);
        true
    }

    pub fn begin_categories(&mut self) {
        if self.is_signed_out() {
            return;
        }
        self.categories = CategoryResultSet::empty();
        self.phase = Phase::LoadingCategories;
        self.loading.categories = true;
    }

    pub fn apply_categories(&mut self, categories: CategoryResultSet) {
        if self.is_signed_out() {
            return;
        }
        self.categories = categories;
        self.loading.categories = false;
        self.phase = if self.categories.any_unauthorized() {
            Phase::SignedOut
        } else {
            Phase::Ready
        };
    }

    pub fn focus(&mut self, category: CategoryKey) {
        self.selection.category = category;
    }

    /// The session is gone: stop, leaving whatever was already loaded.
    pub fn sign_out(&mut self) {
        self.phase = Phase::SignedOut;
        self.loading = LoadingFlags::default();
    }

    pub fn summary(&self) -> Summary {
        derive_summary(SummaryInput {
            mode: self.mode,
            tiles: self.tiles.as_ref(),
            categories: &self.categories,
            focus: self.selection.category,
            year: self.selection.year,
            month: self.selection.month,
        })
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let title = self.mode.title();
        DashboardSnapshot {
            mode: self.mode,
            phase: self.phase,
            selection: self.selection,
            loading: self.loading,
            year_chart: year_dataset(&self.years, title),
            month_chart: month_dataset(&self.months, title),
            years: self.years.clone(),
            months: self.months.clone(),
            categories: self.categories.clone(),
            tiles: self.tiles.clone(),
            summary: self.summary(),
        }
    }
}

/// An immutable copy of the dashboard state, as handed to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub mode: DataMode,
    pub phase: Phase,
    pub selection: Selection,
    pub loading: LoadingFlags,
    pub years: Vec<YearRecord>,
    pub months: Vec<MonthRecord>,
    pub categories: CategoryResultSet,
    pub tiles: Option<Tiles>,
    pub summary: Summary,
    pub year_chart: ChartDataset,
    pub month_chart: ChartDataset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mill_data::records::CategoryRow;
    use serde_json::json;

    fn state() -> DrillState {
        DrillState::new(DataMode::Production, CategoryKey::Book)
    }

    #[test]
    fn latest_year_is_selected() {
        let mut state = state();
        state.begin_initialize();
        state.apply_tiles(None);
        let year = state.apply_years(&[
            json!({"fnYear": 2023, "Production": 100}),
            json!({"fnYear": 2024, "Production": 150}),
        ]);
        assert_eq!(year, Some(2024));
        assert_eq!(state.selection.year, Some(2024));
        assert_eq!(state.phase, Phase::LoadingMonths);
    }

    #[test]
    fn no_years_is_terminal() {
        let mut state = state();
        state.begin_initialize();
        state.apply_tiles(None);
        assert_eq!(state.apply_years(&[json!({"Production": 5})]), None);
        assert_eq!(state.phase, Phase::NoData);
        assert!(!state.loading.any());
    }

    #[test]
    fn new_year_clears_month_and_breakdowns() {
        let mut state = state();
        state.begin_year(2023);
        state.apply_months(&[json!({"Month": 4, "Production": 1})]);
        assert_eq!(state.pick_latest_month(), Some(4));
        let mut categories = CategoryResultSet::empty();
        categories.insert(
            CategoryKey::Book,
            vec![CategoryRow { label: "Atlas".into(), value: 1.0, raw: json!({}) }],
        );
        state.apply_categories(categories);

        state.begin_year(2024);
        assert_eq!(state.selection.month, None);
        assert!(state.months.is_empty());
        assert!(state.categories.is_empty());
    }

    #[test]
    fn month_selection_is_guarded() {
        let mut state = state();
        assert!(!state.select_month(3));
        state.begin_year(2024);
        assert!(!state.select_month(0));
        assert!(!state.select_month(13));
        assert!(state.select_month(12));
        assert_eq!(state.selection.month, Some(12));
    }

    #[test]
    fn label_only_months_fall_back_to_whole_year() {
        let mut state = state();
        state.begin_year(2024);
        state.apply_months(&[json!({"MonthName": "Opening", "Production": 3})]);
        assert_eq!(state.months.len(), 1);
        assert_eq!(state.pick_latest_month(), None);
    }

    #[test]
    fn switch_mode_resets_everything_but_focus_default() {
        let mut state = state();
        state.begin_year(2024);
        state.focus(CategoryKey::Customer);
        state.switch_mode(DataMode::Stock);
        assert_eq!(state.mode, DataMode::Stock);
        assert_eq!(state.selection, Selection::new(CategoryKey::Book));
        assert_eq!(state.phase, Phase::LoadingTiles);
    }

    #[test]
    fn signed_out_sticks_until_reinitialized() {
        let mut state = state();
        state.begin_year(2024);
        state.sign_out();

        let mut categories = CategoryResultSet::empty();
        categories.insert(
            CategoryKey::Book,
            vec![CategoryRow { label: "Atlas".into(), value: 1.0, raw: json!({}) }],
        );
        state.apply_categories(categories);
        state.apply_months(&[json!({"Month": 4})]);
        state.begin_year(2023);
        assert!(!state.select_month(4));
        assert_eq!(state.phase, Phase::SignedOut);
        assert_eq!(state.selection.year, Some(2024));
        assert!(state.categories.is_empty());
        assert!(state.months.is_empty());

        state.begin_initialize();
        assert_eq!(state.phase, Phase::LoadingTiles);
        assert!(state.phase.is_loading());
    }

    #[test]
    fn snapshot_carries_charts_titled_by_mode() {
        let mut state = DrillState::new(DataMode::Stock, CategoryKey::Book);
        state.apply_years(&[json!({"Year": 2022, "Stock": 9})]);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.year_chart.title, "Yearly Stock");
        assert_eq!(snapshot.year_chart.points[0].name, "2022");
        assert_eq!(snapshot.month_chart.title, "Monthly Stock");
    }
}
