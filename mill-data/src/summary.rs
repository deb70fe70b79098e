//! KPI tiles.
//!
//! Figures come from the dedicated tiles fetch when it succeeded. Without
//! tiles, the focused breakdown's rows are summed for the selected period and
//! the summary says so, so the view can label the figure as a year or a month
//! total.

use crate::fields::{as_integer, as_number, as_text, named};
use crate::records::CategoryResultSet;
use mill_api::{CategoryKey, DataMode, RawRow};
use mill_utils::dates::{day_label, parse_backend_date};
use mill_utils::months::month_abbreviation;
use serde::Serialize;
use serde_json::{Map, Value};

/// Rendered in place of a missing label or figure.
pub const MISSING: &str = "—";

/// The KPI snapshot returned by the tiles endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tiles {
    pub year_label: String,
    pub month_label: String,
    pub week_label: String,
    pub day_label: String,
    pub yearly_total: Option<f64>,
    pub monthly_total: Option<f64>,
    pub weekly_total: Option<f64>,
    pub daily_total: Option<f64>,
}

impl Tiles {
    /// Parse a raw tiles object; anything other than an object is `None`.
    pub fn from_raw(raw: &RawRow) -> Option<Self> {
        let row = raw.as_object()?;
        let totals = [
            total(row, &["YearlyProduction", "YearlyStock", "YearlyTotal"]),
            total(row, &["MonthlyProduction", "MonthlyStock", "MonthlyTotal"]),
            total(row, &["WeeklyProduction", "WeeklyStock", "WeeklyTotal"]),
            total(row, &["DailyProduction", "DailyStock", "DailyTotal"]),
        ];
        if totals.iter().all(Option::is_none) {
            return None;
        }
        let [yearly_total, monthly_total, weekly_total, daily_total] = totals;
        let year = named(row, &["Year", "FnYear"]).find_map(as_text);
        let month = named(row, &["Month", "MonthName"]).find_map(month_text);
        let week = named(row, &["Week", "WeekNo"]).find_map(as_text);

        let year_label = year
            .as_ref()
            .map(|y| format!("Year {y}"))
            .unwrap_or_else(|| MISSING.to_string());
        let month_label = match (&month, &year) {
            (Some(m), Some(y)) => format!("{m} {y}"),
            (Some(m), None) => m.clone(),
            _ => MISSING.to_string(),
        };
        let week_label = week
            .map(|w| format!("Week {w}"))
            .unwrap_or_else(|| MISSING.to_string());
        let day_label = named(row, &["Date", "Day"])
            .filter_map(Value::as_str)
            .find_map(|raw| parse_backend_date(raw).ok())
            .map(|date| day_label(&date))
            .unwrap_or_else(|| MISSING.to_string());

        Some(Self {
            year_label,
            month_label,
            week_label,
            day_label,
            yearly_total,
            monthly_total,
            weekly_total,
            daily_total,
        })
    }
}

fn total(row: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    named(row, names).find_map(as_number)
}

/// Month tiles may carry a name ("March") or a number (3).
fn month_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(_) => as_integer(value)
            .and_then(|m| u32::try_from(m).ok())
            .and_then(month_abbreviation)
            .map(str::to_string),
        _ => as_text(value),
    }
}

/// The period a category-row fallback figure covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum Period {
    Year { year: i32 },
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn label(&self) -> String {
        match self {
            Period::Year { year } => format!("Year {year}"),
            Period::Month { year, month } => match month_abbreviation(*month) {
                Some(name) => format!("{name} {year}"),
                None => format!("Year {year}"),
            },
        }
    }
}

/// Where the figures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum SummarySource {
    Tiles,
    CategoryRows { category: CategoryKey, period: Period },
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiFigure {
    pub title: String,
    pub value: Option<f64>,
    pub period_label: String,
}

impl KpiFigure {
    fn new(title: String, value: Option<f64>, period_label: String) -> Self {
        Self {
            title,
            value,
            period_label,
        }
    }

    fn missing(title: String) -> Self {
        Self::new(title, None, MISSING.to_string())
    }
}

/// The four KPI tiles (year, month, week, today) and their source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub source: SummarySource,
    pub figures: Vec<KpiFigure>,
}

/// Everything the deriver reads.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub mode: DataMode,
    pub tiles: Option<&'a Tiles>,
    pub categories: &'a CategoryResultSet,
    pub focus: CategoryKey,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

fn titles(mode: DataMode) -> [String; 4] {
    let noun = mode.title();
    [
        format!("Year {noun}"),
        format!("Month {noun}"),
        format!("Week {noun}"),
        format!("Today {noun}"),
    ]
}

pub fn derive_summary(input: SummaryInput<'_>) -> Summary {
    let [year_title, month_title, week_title, day_title] = titles(input.mode);

    if let Some(tiles) = input.tiles {
        return Summary {
            source: SummarySource::Tiles,
            figures: vec![
                KpiFigure::new(year_title, tiles.yearly_total, tiles.year_label.clone()),
                KpiFigure::new(month_title, tiles.monthly_total, tiles.month_label.clone()),
                KpiFigure::new(week_title, tiles.weekly_total, tiles.week_label.clone()),
                KpiFigure::new(day_title, tiles.daily_total, tiles.day_label.clone()),
            ],
        };
    }

    let Some(year) = input.year else {
        return Summary {
            source: SummarySource::Unavailable,
            figures: vec![
                KpiFigure::missing(year_title),
                KpiFigure::missing(month_title),
                KpiFigure::missing(week_title),
                KpiFigure::missing(day_title),
            ],
        };
    };

    // A failed breakdown has no total, not a zero one.
    let sum = match input.categories.failure(input.focus) {
        Some(_) => None,
        None => Some(input.categories.total(input.focus)),
    };
    let (period, year_figure, month_figure) = match input.month {
        Some(month) => {
            let period = Period::Month { year, month };
            (
                period,
                KpiFigure::missing(year_title),
                KpiFigure::new(month_title, sum, period.label()),
            )
        }
        None => {
            let period = Period::Year { year };
            (
                period,
                KpiFigure::new(year_title, sum, period.label()),
                KpiFigure::missing(month_title),
            )
        }
    };

    Summary {
        source: SummarySource::CategoryRows {
            category: input.focus,
            period,
        },
        figures: vec![
            year_figure,
            month_figure,
            KpiFigure::missing(week_title),
            KpiFigure::missing(day_title),
        ],
    }
}
