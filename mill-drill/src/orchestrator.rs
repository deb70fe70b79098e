//! The drill-down orchestrator.
//!
//! Load order is tiles, then years, then the months of the selected year,
//! then the six breakdowns for the selected year and month. Each transition
//! re-runs only the suffix of that chain it invalidates.
//!
//! Everything runs on one thread. State sits in a `RefCell` that is only
//! borrowed between awaits, so transitions may overlap freely; two generation
//! fences decide which results still apply when they arrive:
//!
//! - the drill fence (Initialize, SelectYear, SwitchMode, Refresh) guards
//!   tiles, years and months;
//! - the breakdown fence (every fetching transition, SelectMonth included)
//!   guards breakdowns and the automatic latest-month pick.
//!
//! A month picked by the user while its year's months are still loading is
//! therefore kept, and the month list still lands.

use crate::config::DrillConfig;
use crate::fence::{Generation, Ticket};
use crate::group::fetch_categories;
use crate::state::{DashboardSnapshot, DrillState};
use mill_api::{ApiError, CategoryKey, DataMode, DataSource, FetchParams};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Observer = Rc<dyn Fn(&DashboardSnapshot)>;

#[derive(Default)]
struct Observers {
    next_id: Cell<u64>,
    list: RefCell<Vec<(u64, Observer)>>,
}

/// Handle returned by [`Orchestrator::subscribe`].
pub struct Subscription {
    id: u64,
    observers: Weak<Observers>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(observers) = self.observers.upgrade() {
            observers.list.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Result of a fetch once errors have been turned into empty results.
enum Outcome<T> {
    Loaded(T),
    SignedOut,
}

pub struct Orchestrator<S> {
    source: S,
    config: DrillConfig,
    state: RefCell<DrillState>,
    drill: Generation,
    breakdown: Generation,
    observers: Rc<Observers>,
}

impl<S: DataSource> Orchestrator<S> {
    pub fn new(source: S, mode: DataMode, config: DrillConfig) -> Self {
        Self {
            source,
            state: RefCell::new(DrillState::new(mode, config.default_category)),
            config,
            drill: Generation::default(),
            breakdown: Generation::default(),
            observers: Rc::default(),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state.borrow().snapshot()
    }

    pub fn mode(&self) -> DataMode {
        self.state.borrow().mode
    }

    /// Call `observer` with a fresh snapshot after every state change.
    pub fn subscribe(&self, observer: impl Fn(&DashboardSnapshot) + 'static) -> Subscription {
        let id = self.observers.next_id.get();
        self.observers.next_id.set(id + 1);
        self.observers.list.borrow_mut().push((id, Rc::new(observer)));
        Subscription {
            id,
            observers: Rc::downgrade(&self.observers),
        }
    }

    fn update(&self, change: impl FnOnce(&mut DrillState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            change(&mut state);
            state.snapshot()
        };
        let observers: Vec<Observer> = self
            .observers
            .list
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(&snapshot);
        }
    }

    /// Clear everything and load the current mode from the top.
    pub async fn initialize(&self) {
        let drill = self.drill.advance();
        let breakdown = self.breakdown.advance();
        let mode = self.mode();
        log::info!("[Mill] Loading {mode} dashboard");
        self.update(DrillState::begin_initialize);
        self.load_from_tiles(mode, drill, breakdown).await;
    }

    /// Reload the current mode.
    pub async fn refresh(&self) {
        self.initialize().await;
    }

    /// Reset and load from the other data source.
    pub async fn switch_mode(&self, mode: DataMode) {
        let drill = self.drill.advance();
        let breakdown = self.breakdown.advance();
        log::info!("[Mill] Switching to {mode}");
        self.update(|state| state.switch_mode(mode));
        self.load_from_tiles(mode, drill, breakdown).await;
    }

    fn signed_out(&self) -> bool {
        self.state.borrow().is_signed_out()
    }

    /// Drill into `year`. Non-positive years are ignored, as is everything
    /// after a sign-out.
    pub async fn select_year(&self, year: i32) {
        if year <= 0 || self.signed_out() {
            log::debug!("[Mill] Ignoring year selection {year}");
            return;
        }
        let drill = self.drill.advance();
        let breakdown = self.breakdown.advance();
        let mode = self.mode();
        self.update(|state| state.begin_year(year));
        self.load_months(mode, year, drill, breakdown).await;
    }

    /// Drill into `month` of the selected year. Ignored without a selected
    /// year or outside 1..=12.
    pub async fn select_month(&self, month: u32) {
        let (mode, year) = {
            let state = self.state.borrow();
            let year = state.selection.year.filter(|_| !state.is_signed_out());
            (state.mode, year)
        };
        let Some(year) = year.filter(|_| (1..=12).contains(&month)) else {
            log::debug!("[Mill] Ignoring month selection {month}");
            return;
        };
        let breakdown = self.breakdown.advance();
        self.update(|state| {
            state.select_month(month);
        });
        self.load_categories(mode, year, Some(month), breakdown).await;
    }

    /// Focus another breakdown. The result set already holds all six.
    pub fn focus_category(&self, category: CategoryKey) {
        self.update(|state| state.focus(category));
    }

    async fn load_from_tiles(&self, mode: DataMode, drill: Ticket, breakdown: Ticket) {
        let tiles = self.source.fetch_tiles(mode).await;
        if !self.drill.is_current(drill) {
            return;
        }
        let tiles = match self.settle(tiles, "tiles") {
            Outcome::Loaded(tiles) => tiles.flatten(),
            Outcome::SignedOut => return,
        };
        self.update(|state| state.apply_tiles(tiles));

        let rows = self.source.fetch_rows(mode, FetchParams::years()).await;
        if !self.drill.is_current(drill) {
            return;
        }
        let rows = match self.settle(rows, "years") {
            Outcome::Loaded(rows) => rows.unwrap_or_default(),
            Outcome::SignedOut => return,
        };
        if self.signed_out() {
            return;
        }
        let mut latest = None;
        self.update(|state| latest = state.apply_years(&rows));
        let Some(year) = latest else {
            log::info!("[Mill] No {mode} years available");
            return;
        };
        self.load_months(mode, year, drill, breakdown).await;
    }

    async fn load_months(&self, mode: DataMode, year: i32, drill: Ticket, breakdown: Ticket) {
        let rows = self.source.fetch_rows(mode, FetchParams::months(year)).await;
        if !self.drill.is_current(drill) {
            return;
        }
        let rows = match self.settle(rows, "months") {
            Outcome::Loaded(rows) => rows.unwrap_or_default(),
            Outcome::SignedOut => return,
        };
        if self.signed_out() {
            return;
        }
        if !self.breakdown.is_current(breakdown) {
            // The user picked a month meanwhile; that pick owns the breakdown.
            self.update(|state| state.apply_months(&rows));
            return;
        }
        let mut month = None;
        self.update(|state| {
            state.apply_months(&rows);
            month = state.pick_latest_month();
        });
        self.load_categories(mode, year, month, breakdown).await;
    }

    async fn load_categories(&self, mode: DataMode, year: i32, month: Option<u32>, breakdown: Ticket) {
        if self.signed_out() {
            return;
        }
        self.update(DrillState::begin_categories);
        let categories =
            fetch_categories(&self.source, mode, year, month, self.config.limit()).await;
        if !self.breakdown.is_current(breakdown) || self.signed_out() {
            return;
        }
        if categories.any_unauthorized() {
            log::warn!("[Mill] Breakdown fetch rejected; signed out");
        }
        self.update(|state| state.apply_categories(categories));
    }

    /// Turn a fetch result into data or a sign-out. Transport failures
    /// become `Loaded(None)`.
    fn settle<T>(&self, result: Result<T, ApiError>, what: &str) -> Outcome<Option<T>> {
        match result {
            Ok(value) => Outcome::Loaded(Some(value)),
            Err(err) if err.is_unauthorized() => {
                log::warn!("[Mill] {what} fetch rejected; signed out");
                self.update(DrillState::sign_out);
                Outcome::SignedOut
            }
            Err(err) => {
                log::warn!("[Mill] {what} fetch failed: {err}");
                Outcome::Loaded(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Phase, Selection};
    use mill_api::{RawRow, Result, RowKind};
    use mill_data::SummarySource;
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::sync::oneshot;

    #[derive(Clone)]
    enum Reply {
        Rows(Vec<RawRow>),
        Unauthorized,
        Down,
    }

    struct Gate {
        entered: Option<oneshot::Sender<()>>,
        release: oneshot::Receiver<()>,
    }

    /// Scripted backend. Unscripted requests answer with no rows.
    #[derive(Default)]
    struct FakeSource {
        rows: RefCell<HashMap<(DataMode, FetchParams), Reply>>,
        tiles: RefCell<HashMap<DataMode, Reply>>,
        gates: RefCell<HashMap<(DataMode, FetchParams), Gate>>,
        calls: RefCell<Vec<(DataMode, FetchParams)>>,
    }

    impl FakeSource {
        fn rows(&self, mode: DataMode, params: FetchParams, reply: Reply) {
            self.rows.borrow_mut().insert((mode, params), reply);
        }

        fn tiles(&self, mode: DataMode, reply: Reply) {
            self.tiles.borrow_mut().insert(mode, reply);
        }

        /// Hold `params` until released. The first receiver fires once the
        /// request has been issued.
        fn gate(&self, mode: DataMode, params: FetchParams) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
            let (entered_tx, entered_rx) = oneshot::channel();
            let (release_tx, release_rx) = oneshot::channel();
            self.gates.borrow_mut().insert(
                (mode, params),
                Gate {
                    entered: Some(entered_tx),
                    release: release_rx,
                },
            );
            (entered_rx, release_tx)
        }

        fn calls_of(&self, kind: RowKind) -> Vec<FetchParams> {
            self.calls
                .borrow()
                .iter()
                .filter(|(_, params)| params.kind == kind)
                .map(|(_, params)| *params)
                .collect()
        }

        fn category_calls(&self) -> Vec<FetchParams> {
            self.calls
                .borrow()
                .iter()
                .filter(|(_, params)| matches!(params.kind, RowKind::Category(_)))
                .map(|(_, params)| *params)
                .collect()
        }
    }

    fn answer<T>(reply: Option<Reply>, ok: impl FnOnce(Vec<RawRow>) -> T, empty: T) -> Result<T> {
        match reply {
            Some(Reply::Rows(rows)) => Ok(ok(rows)),
            Some(Reply::Unauthorized) => Err(ApiError::Unauthorized),
            Some(Reply::Down) => Err(ApiError::Transport("backend down".into())),
            None => Ok(empty),
        }
    }

    impl DataSource for FakeSource {
        async fn fetch_rows(&self, mode: DataMode, params: FetchParams) -> Result<Vec<RawRow>> {
            self.calls.borrow_mut().push((mode, params));
            let gate = self.gates.borrow_mut().remove(&(mode, params));
            if let Some(mut gate) = gate {
                if let Some(entered) = gate.entered.take() {
                    let _ = entered.send(());
                }
                let _ = gate.release.await;
            }
            let reply = self.rows.borrow().get(&(mode, params)).cloned();
            answer(reply, |rows| rows, Vec::new())
        }

        async fn fetch_tiles(&self, mode: DataMode) -> Result<Option<RawRow>> {
            let reply = self.tiles.borrow().get(&mode).cloned();
            answer(reply, |rows| rows.into_iter().next(), None)
        }
    }

    const P: DataMode = DataMode::Production;

    fn scenario() -> Rc<FakeSource> {
        let source = Rc::new(FakeSource::default());
        source.rows(
            P,
            FetchParams::years(),
            Reply::Rows(vec![
                json!({"fnYear": 2023, "Production": 100}),
                json!({"fnYear": 2024, "Production": 150}),
            ]),
        );
        source.rows(
            P,
            FetchParams::months(2024),
            Reply::Rows(vec![
                json!({"Month": 3, "Production": 40}),
                json!({"Month": 5, "Production": 60}),
            ]),
        );
        source.rows(
            P,
            FetchParams::months(2023),
            Reply::Rows(vec![json!({"Month": 11, "Production": 70})]),
        );
        source.rows(
            P,
            FetchParams::category(CategoryKey::Book, 2024, Some(5)),
            Reply::Rows(vec![
                json!({"BookName": "Atlas", "Production": "250"}),
                json!({"BookName": "Ledger", "Production": 50}),
            ]),
        );
        source
    }

    fn orchestrator(source: &Rc<FakeSource>) -> Orchestrator<Rc<FakeSource>> {
        Orchestrator::new(source.clone(), P, DrillConfig::default())
    }

    #[tokio::test]
    async fn initialize_drills_to_latest_year_and_month() {
        let source = scenario();
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.phase, Phase::Ready);
        assert_eq!(snapshot.selection.year, Some(2024));
        assert_eq!(snapshot.selection.month, Some(5));
        assert_eq!(snapshot.years.len(), 2);
        assert_eq!(source.calls_of(RowKind::Month), vec![FetchParams::months(2024)]);

        let categories = source.category_calls();
        assert_eq!(categories.len(), 6);
        assert!(categories.iter().all(|p| p.year == Some(2024) && p.month == Some(5)));

        let books = snapshot.categories.get(CategoryKey::Book);
        assert_eq!(books[0].label, "Atlas");
        assert_eq!(books[0].value, 250.0);
        assert!(!snapshot.loading.any());
    }

    #[tokio::test]
    async fn empty_year_list_stops_at_no_data() {
        let source = Rc::new(FakeSource::default());
        source.rows(P, FetchParams::years(), Reply::Rows(vec![]));
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;

        assert_eq!(orchestrator.snapshot().phase, Phase::NoData);
        assert!(source.calls_of(RowKind::Month).is_empty());
        assert!(source.category_calls().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_years_sign_out_and_stop() {
        let source = Rc::new(FakeSource::default());
        source.rows(P, FetchParams::years(), Reply::Unauthorized);
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.phase, Phase::SignedOut);
        assert!(snapshot.years.is_empty());
        assert!(!snapshot.loading.any());
        assert_eq!(source.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn transport_failures_become_empty_lists() {
        let source = scenario();
        source.tiles(P, Reply::Down);
        source.rows(P, FetchParams::months(2024), Reply::Down);
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.phase, Phase::Ready);
        assert!(snapshot.months.is_empty());
        assert_eq!(snapshot.selection.month, None);
        let categories = source.category_calls();
        assert_eq!(categories.len(), 6);
        assert!(categories.iter().all(|p| p.year == Some(2024) && p.month.is_none()));
    }

    #[tokio::test]
    async fn later_year_selection_wins() {
        let source = scenario();
        let orchestrator = orchestrator(&source);
        let (entered, release) = source.gate(P, FetchParams::months(2023));

        futures::join!(orchestrator.select_year(2023), async {
            let _ = entered.await;
            orchestrator.select_year(2024).await;
            let _ = release.send(());
        });

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.selection.year, Some(2024));
        assert_eq!(snapshot.selection.month, Some(5));
        assert!(snapshot.months.iter().all(|m| m.month_number != Some(11)));
        assert!(source.category_calls().iter().all(|p| p.year == Some(2024)));
        assert_eq!(snapshot.categories.get(CategoryKey::Book)[0].label, "Atlas");
    }

    #[tokio::test]
    async fn stale_breakdown_is_discarded() {
        let source = scenario();
        source.rows(
            P,
            FetchParams::category(CategoryKey::Book, 2024, Some(3)),
            Reply::Rows(vec![json!({"BookName": "March Book", "Production": 1})]),
        );
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;

        let (entered, release) =
            source.gate(P, FetchParams::category(CategoryKey::Book, 2024, Some(5)));
        futures::join!(orchestrator.select_month(5), async {
            let _ = entered.await;
            orchestrator.select_month(3).await;
            let _ = release.send(());
        });

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.selection.month, Some(3));
        assert_eq!(snapshot.categories.get(CategoryKey::Book)[0].label, "March Book");
        assert_eq!(snapshot.phase, Phase::Ready);
    }

    #[tokio::test]
    async fn month_picked_while_months_load_is_kept() {
        let source = scenario();
        source.rows(
            P,
            FetchParams::category(CategoryKey::Book, 2024, Some(3)),
            Reply::Rows(vec![json!({"BookName": "March Book", "Production": 1})]),
        );
        let orchestrator = orchestrator(&source);
        let (entered, release) = source.gate(P, FetchParams::months(2024));

        futures::join!(orchestrator.select_year(2024), async {
            let _ = entered.await;
            orchestrator.select_month(3).await;
            let _ = release.send(());
        });

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.selection.month, Some(3));
        assert_eq!(snapshot.months.len(), 2);
        assert!(source.category_calls().iter().all(|p| p.month == Some(3)));
        assert_eq!(snapshot.categories.get(CategoryKey::Book)[0].label, "March Book");
    }

    #[tokio::test]
    async fn invalid_selections_are_ignored() {
        let source = scenario();
        let orchestrator = orchestrator(&source);
        orchestrator.select_month(5).await;
        orchestrator.select_year(0).await;
        assert!(source.calls.borrow().is_empty());

        orchestrator.initialize().await;
        let before = source.calls.borrow().len();
        orchestrator.select_month(13).await;
        assert_eq!(source.calls.borrow().len(), before);
        assert_eq!(orchestrator.snapshot().selection.month, Some(5));
    }

    #[tokio::test]
    async fn switch_mode_reloads_from_the_other_source() {
        let source = scenario();
        source.rows(
            DataMode::Stock,
            FetchParams::years(),
            Reply::Rows(vec![json!({"Year": 2022, "Stock": 12})]),
        );
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;
        orchestrator.focus_category(CategoryKey::Beam);
        orchestrator.switch_mode(DataMode::Stock).await;

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.mode, DataMode::Stock);
        assert_eq!(snapshot.selection.year, Some(2022));
        assert_eq!(snapshot.selection.month, None);
        assert_eq!(snapshot.selection.category, CategoryKey::Book);
        assert!(snapshot.categories.is_empty());
        assert!(source
            .calls
            .borrow()
            .iter()
            .any(|(mode, params)| *mode == DataMode::Stock && *params == FetchParams::months(2022)));
    }

    #[tokio::test]
    async fn summary_prefers_tiles() {
        let source = scenario();
        source.tiles(
            P,
            Reply::Rows(vec![json!({"Year": 2024, "YearlyProduction": 900})]),
        );
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;
        let summary = orchestrator.snapshot().summary;
        assert_eq!(summary.source, SummarySource::Tiles);
        assert_eq!(summary.figures[0].value, Some(900.0));
    }

    #[tokio::test]
    async fn summary_falls_back_to_focused_breakdown() {
        let source = scenario();
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;

        let summary = orchestrator.snapshot().summary;
        assert!(matches!(
            summary.source,
            SummarySource::CategoryRows { category: CategoryKey::Book, .. }
        ));
        assert_eq!(summary.figures[1].value, Some(300.0));

        orchestrator.focus_category(CategoryKey::Beam);
        assert_eq!(orchestrator.snapshot().summary.figures[1].value, Some(0.0));
    }

    #[tokio::test]
    async fn observers_see_each_step_until_unsubscribed() {
        let source = scenario();
        let orchestrator = orchestrator(&source);
        let phases = Rc::new(RefCell::new(Vec::new()));
        let seen = phases.clone();
        let subscription = orchestrator.subscribe(move |snapshot| seen.borrow_mut().push(snapshot.phase));

        orchestrator.initialize().await;
        let recorded = phases.borrow().clone();
        assert_eq!(recorded.first(), Some(&Phase::LoadingTiles));
        assert_eq!(recorded.last(), Some(&Phase::Ready));
        assert!(recorded.contains(&Phase::LoadingMonths));
        assert!(recorded.contains(&Phase::LoadingCategories));

        subscription.unsubscribe();
        orchestrator.focus_category(CategoryKey::Item);
        assert_eq!(phases.borrow().len(), recorded.len());
    }

    #[tokio::test]
    async fn refresh_reloads_from_the_latest_year() {
        let source = scenario();
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;
        orchestrator.select_year(2023).await;
        orchestrator.focus_category(CategoryKey::Selvage);
        assert_eq!(orchestrator.snapshot().selection.month, Some(11));

        orchestrator.refresh().await;
        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.phase, Phase::Ready);
        assert_eq!(snapshot.selection, Selection { year: Some(2024), month: Some(5), category: CategoryKey::Book });
        assert_eq!(source.calls_of(RowKind::Year).len(), 2);
    }

    #[tokio::test]
    async fn selections_after_sign_out_fetch_nothing() {
        let source = scenario();
        source.rows(
            P,
            FetchParams::category(CategoryKey::Beam, 2024, Some(5)),
            Reply::Unauthorized,
        );
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;
        assert_eq!(orchestrator.snapshot().phase, Phase::SignedOut);

        let before = source.calls.borrow().len();
        orchestrator.select_year(2023).await;
        orchestrator.select_month(3).await;
        assert_eq!(source.calls.borrow().len(), before);
        assert_eq!(orchestrator.snapshot().phase, Phase::SignedOut);
        assert_eq!(orchestrator.snapshot().selection.year, Some(2024));
    }

    #[tokio::test]
    async fn late_breakdown_after_sign_out_keeps_the_dashboard_signed_out() {
        let source = scenario();
        source.rows(P, FetchParams::months(2023), Reply::Unauthorized);
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;

        let (entered, release) =
            source.gate(P, FetchParams::category(CategoryKey::Book, 2024, Some(3)));
        futures::join!(orchestrator.select_month(3), async {
            let _ = entered.await;
            orchestrator.select_year(2023).await;
            let _ = release.send(());
        });

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.phase, Phase::SignedOut);
        assert!(!snapshot.loading.any());
    }

    #[tokio::test]
    async fn unauthorized_breakdown_signs_out() {
        let source = scenario();
        source.rows(
            P,
            FetchParams::category(CategoryKey::Factory, 2024, Some(5)),
            Reply::Unauthorized,
        );
        let orchestrator = orchestrator(&source);
        orchestrator.initialize().await;
        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.phase, Phase::SignedOut);
        assert_eq!(snapshot.categories.get(CategoryKey::Book).len(), 2);
    }
}
