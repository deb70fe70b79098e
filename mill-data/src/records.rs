//! Typed records for each drill-down level.

use crate::normalize::{normalize, Role};
use mill_api::{CategoryKey, RawRow};
use serde::Serialize;
use std::collections::BTreeMap;

/// One bar of the year chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: i32,
    pub production_total: f64,
}

impl YearRecord {
    pub fn from_raw(raw: &RawRow) -> Option<Self> {
        let record = normalize(raw, Role::Year)?;
        let year = record.name.parse().ok()?;
        Some(Self {
            year,
            production_total: record.value,
        })
    }
}

/// One point of the month chart.
///
/// `month_number` is `None` when the row carried only a label; such records
/// can be drawn but never drive a month selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    pub month_number: Option<u32>,
    pub month_label: String,
    pub production_total: f64,
    pub raw: RawRow,
}

impl MonthRecord {
    pub fn from_raw(raw: &RawRow) -> Option<Self> {
        let record = normalize(raw, Role::Month)?;
        Some(Self {
            month_number: record.month_number,
            month_label: record.name,
            production_total: record.value,
            raw: record.raw,
        })
    }
}

/// One entity (a book, a beam, ...) of a breakdown list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub label: String,
    pub value: f64,
    pub raw: RawRow,
}

/// Year records for every row that has a year, oldest first. Rows for the
/// same year are merged into one record with their totals summed.
pub fn year_records(rows: &[RawRow]) -> Vec<YearRecord> {
    let parsed: Vec<YearRecord> = rows.iter().filter_map(YearRecord::from_raw).collect();
    if parsed.len() < rows.len() {
        log::debug!("[Mill] Dropped {} year rows without a year", rows.len() - parsed.len());
    }
    let mut years: Vec<YearRecord> = Vec::with_capacity(parsed.len());
    for record in parsed {
        match years.iter_mut().find(|y| y.year == record.year) {
            Some(existing) => existing.production_total += record.production_total,
            None => years.push(record),
        }
    }
    years.sort_by_key(|y| y.year);
    years
}

/// Month records in calendar order; label-only months follow in backend
/// order. Rows for the same month number are merged with totals summed.
pub fn month_records(rows: &[RawRow]) -> Vec<MonthRecord> {
    let parsed: Vec<MonthRecord> = rows.iter().filter_map(MonthRecord::from_raw).collect();
    if parsed.len() < rows.len() {
        log::debug!("[Mill] Dropped {} unusable month rows", rows.len() - parsed.len());
    }
    let mut months: Vec<MonthRecord> = Vec::with_capacity(parsed.len());
    for record in parsed {
        let duplicate = record
            .month_number
            .and_then(|n| months.iter_mut().find(|m| m.month_number == Some(n)));
        match duplicate {
            Some(existing) => existing.production_total += record.production_total,
            None => months.push(record),
        }
    }
    months.sort_by_key(|m| m.month_number.unwrap_or(u32::MAX));
    months
}

pub fn category_rows(key: CategoryKey, rows: &[RawRow]) -> Vec<CategoryRow> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, raw)| normalize(raw, Role::Category { key, index }))
        .map(|record| CategoryRow {
            label: record.name,
            value: record.value,
            raw: record.raw,
        })
        .collect()
}

pub fn latest_year(years: &[YearRecord]) -> Option<i32> {
    years.iter().map(|y| y.year).max()
}

/// Month numbers usable for selection, in list order.
pub fn selectable_months(months: &[MonthRecord]) -> impl Iterator<Item = u32> + '_ {
    months.iter().filter_map(|m| m.month_number)
}

pub fn latest_month(months: &[MonthRecord]) -> Option<u32> {
    selectable_months(months).max()
}

/// Why a category slot is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchFailure {
    Transport,
    Unauthorized,
}

/// Breakdown rows for all six categories.
///
/// Every key is always present; a failed fetch leaves its key empty and is
/// recorded in `failures` without touching the other five.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResultSet {
    rows: BTreeMap<CategoryKey, Vec<CategoryRow>>,
    failures: BTreeMap<CategoryKey, FetchFailure>,
}

impl Default for CategoryResultSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl CategoryResultSet {
    pub fn empty() -> Self {
        Self {
            rows: CategoryKey::ALL.into_iter().map(|key| (key, Vec::new())).collect(),
            failures: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: CategoryKey, rows: Vec<CategoryRow>) {
        self.failures.remove(&key);
        self.rows.insert(key, rows);
    }

    pub fn mark_failed(&mut self, key: CategoryKey, failure: FetchFailure) {
        self.rows.insert(key, Vec::new());
        self.failures.insert(key, failure);
    }

    pub fn get(&self, key: CategoryKey) -> &[CategoryRow] {
        self.rows.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryKey, &[CategoryRow])> + '_ {
        CategoryKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    pub fn keys(&self) -> impl Iterator<Item = CategoryKey> + '_ {
        self.rows.keys().copied()
    }

    pub fn failure(&self, key: CategoryKey) -> Option<FetchFailure> {
        self.failures.get(&key).copied()
    }

    pub fn failed_keys(&self) -> impl Iterator<Item = CategoryKey> + '_ {
        self.failures.keys().copied()
    }

    pub fn any_unauthorized(&self) -> bool {
        self.failures.values().any(|f| *f == FetchFailure::Unauthorized)
    }

    /// True when no category has any row.
    pub fn is_empty(&self) -> bool {
        self.rows.values().all(Vec::is_empty)
    }

    pub fn total(&self, key: CategoryKey) -> f64 {
        self.get(key).iter().fold(0.0, |sum, row| sum + row.value)
    }
}
