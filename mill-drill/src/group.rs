//! The six-way category breakdown fetch.

use futures::stream::{self, StreamExt};
use mill_api::{ApiError, CategoryKey, DataMode, DataSource, FetchParams};
use mill_data::records::{category_rows, CategoryResultSet, FetchFailure};

/// Fetch every breakdown category for `(year, month)`, at most `limit` at a
/// time.
///
/// Never fails. A category whose fetch fails is left empty and marked with
/// the failure; the other categories are unaffected. Results are keyed, so
/// completion order does not matter.
pub async fn fetch_categories<S: DataSource>(
    source: &S,
    mode: DataMode,
    year: i32,
    month: Option<u32>,
    limit: usize,
) -> CategoryResultSet {
    let outcomes: Vec<_> = stream::iter(CategoryKey::ALL)
        .map(|key| async move {
            let result = source
                .fetch_rows(mode, FetchParams::category(key, year, month))
                .await;
            (key, result)
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    let mut set = CategoryResultSet::empty();
    for (key, result) in outcomes {
        match result {
            Ok(rows) => set.insert(key, category_rows(key, &rows)),
            Err(err) => {
                log::warn!("[Mill] {key} breakdown for {year}/{month:?} failed: {err}");
                set.mark_failed(key, failure_kind(&err));
            }
        }
    }
    log::debug!(
        "[Mill] Breakdown {year}/{month:?}: {} categories failed",
        set.failed_keys().count()
    );
    set
}

fn failure_kind(err: &ApiError) -> FetchFailure {
    if err.is_unauthorized() {
        FetchFailure::Unauthorized
    } else {
        FetchFailure::Transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mill_api::{RawRow, Result, RowKind};
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    /// Answers every category, failing the listed ones.
    #[derive(Default)]
    struct Breakdowns {
        failing: Vec<CategoryKey>,
        unauthorized: Vec<CategoryKey>,
        seen: RefCell<Vec<FetchParams>>,
        in_flight: Cell<usize>,
        peak: Cell<usize>,
    }

    impl DataSource for Breakdowns {
        async fn fetch_rows(&self, _mode: DataMode, params: FetchParams) -> Result<Vec<RawRow>> {
            self.seen.borrow_mut().push(params);
            self.in_flight.set(self.in_flight.get() + 1);
            self.peak.set(self.peak.get().max(self.in_flight.get()));
            tokio::task::yield_now().await;
            self.in_flight.set(self.in_flight.get() - 1);

            let RowKind::Category(key) = params.kind else {
                return Ok(Vec::new());
            };
            if self.unauthorized.contains(&key) {
                return Err(ApiError::Unauthorized);
            }
            if self.failing.contains(&key) {
                return Err(ApiError::Transport("connection reset".into()));
            }
            Ok(vec![json!({ "Name": format!("{key} one"), "Production": 10 })])
        }

        async fn fetch_tiles(&self, _mode: DataMode) -> Result<Option<RawRow>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_blank_the_rest() {
        let source = Breakdowns {
            failing: vec![CategoryKey::Beam],
            ..Default::default()
        };
        let set = fetch_categories(&source, DataMode::Production, 2024, Some(5), 6).await;
        assert!(set.get(CategoryKey::Beam).is_empty());
        assert_eq!(set.failure(CategoryKey::Beam), Some(FetchFailure::Transport));
        for key in CategoryKey::ALL.into_iter().filter(|k| *k != CategoryKey::Beam) {
            assert_eq!(set.get(key).len(), 1, "{key}");
            assert_eq!(set.get(key)[0].value, 10.0);
        }
    }

    #[tokio::test]
    async fn all_six_keys_survive_total_failure() {
        let source = Breakdowns {
            failing: CategoryKey::ALL.to_vec(),
            unauthorized: vec![CategoryKey::Customer],
            ..Default::default()
        };
        let set = fetch_categories(&source, DataMode::Stock, 2023, None, 6).await;
        assert_eq!(set.keys().count(), 6);
        assert_eq!(set.failed_keys().count(), 6);
        assert!(set.is_empty());
        assert!(set.any_unauthorized());
    }

    #[tokio::test]
    async fn every_fetch_carries_year_and_month() {
        let source = Breakdowns::default();
        fetch_categories(&source, DataMode::Production, 2024, Some(5), 6).await;
        let seen = source.seen.borrow();
        assert_eq!(seen.len(), 6);
        assert!(seen.iter().all(|p| p.year == Some(2024) && p.month == Some(5)));
    }

    #[tokio::test]
    async fn in_flight_limit_is_respected() {
        let source = Breakdowns::default();
        fetch_categories(&source, DataMode::Production, 2024, None, 2).await;
        assert_eq!(source.seen.borrow().len(), 6);
        assert_eq!(source.peak.get(), 2);
    }
}
