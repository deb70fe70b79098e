//! Chart adapter: records in, chart datasets out; chart clicks in, domain
//! selections out.
//!
//! Points keep the full label in `name`. Truncation happens only in
//! `axis_label`, which the renderer uses for tick text.

use crate::normalize::{extract_month, extract_year, parse_month_text};
use crate::records::{CategoryRow, MonthRecord, YearRecord};
use mill_api::{CategoryKey, RawRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tick label width for breakdown bar charts.
pub const AXIS_LABEL_MAX: usize = 18;
/// Tick label width for mini bars.
pub const MINI_LABEL_MAX: usize = 6;
/// Mini bars show the first few entities only.
pub const MINI_BAR_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    MiniBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
    pub axis_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

impl ChartDataset {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Shorten `label` to `max` characters plus an ellipsis, on char boundaries.
pub fn axis_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max).collect();
        short.push('…');
        short
    }
}

pub fn year_points(years: &[YearRecord]) -> Vec<ChartPoint> {
    years
        .iter()
        .map(|y| {
            let name = y.year.to_string();
            ChartPoint {
                axis_label: name.clone(),
                name,
                value: y.production_total,
                month_number: None,
                raw: None,
            }
        })
        .collect()
}

pub fn month_points(months: &[MonthRecord]) -> Vec<ChartPoint> {
    months
        .iter()
        .map(|m| ChartPoint {
            name: m.month_label.clone(),
            value: m.production_total,
            axis_label: m.month_label.clone(),
            month_number: m.month_number,
            raw: Some(m.raw.clone()),
        })
        .collect()
}

pub fn category_points(rows: &[CategoryRow], label_max: usize) -> Vec<ChartPoint> {
    rows.iter()
        .map(|row| ChartPoint {
            name: row.label.clone(),
            value: row.value,
            axis_label: axis_label(&row.label, label_max),
            month_number: None,
            raw: Some(row.raw.clone()),
        })
        .collect()
}

pub fn year_dataset(years: &[YearRecord], mode_title: &str) -> ChartDataset {
    ChartDataset {
        kind: ChartKind::Bar,
        title: format!("Yearly {mode_title}"),
        points: year_points(years),
    }
}

pub fn month_dataset(months: &[MonthRecord], mode_title: &str) -> ChartDataset {
    ChartDataset {
        kind: ChartKind::Line,
        title: format!("Monthly {mode_title}"),
        points: month_points(months),
    }
}

pub fn category_dataset(key: CategoryKey, rows: &[CategoryRow], mode_title: &str) -> ChartDataset {
    ChartDataset {
        kind: ChartKind::Bar,
        title: format!("{} Wise {mode_title}", key.title()),
        points: category_points(rows, AXIS_LABEL_MAX),
    }
}

pub fn category_pie(key: CategoryKey, rows: &[CategoryRow]) -> ChartDataset {
    ChartDataset {
        kind: ChartKind::Pie,
        title: format!("{} Share", key.title()),
        points: category_points(rows, AXIS_LABEL_MAX),
    }
}

pub fn category_mini_bar(key: CategoryKey, rows: &[CategoryRow]) -> ChartDataset {
    let head = &rows[..rows.len().min(MINI_BAR_LIMIT)];
    ChartDataset {
        kind: ChartKind::MiniBar,
        title: key.title().to_string(),
        points: category_points(head, MINI_LABEL_MAX),
    }
}

/// A click as reported by the chart renderer: the category-axis label under
/// the cursor and/or the data point that was hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartClick {
    #[serde(default)]
    pub active_label: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl ChartClick {
    pub fn on_point(point: &ChartPoint) -> Self {
        Self {
            active_label: Some(point.name.clone()),
            payload: serde_json::to_value(point).ok(),
        }
    }
}

/// The year a click on the year chart selects, if any.
pub fn decode_year_click(click: &ChartClick) -> Option<i32> {
    let from_label = click
        .active_label
        .as_deref()
        .and_then(|label| label.trim().parse::<i32>().ok());
    let from_payload = || {
        let payload = click.payload.as_ref()?;
        payload
            .get("name")
            .and_then(extract_year)
            .or_else(|| payload.get("raw").and_then(extract_year))
    };
    from_label.or_else(from_payload).filter(|year| *year > 0)
}

/// The month a click on the month chart selects, if any.
///
/// Uses the row normalizer's month rules on the clicked point's raw row,
/// then on the point itself, then on the axis label.
pub fn decode_month_click(click: &ChartClick) -> Option<u32> {
    let from_payload = click.payload.as_ref().and_then(|payload| {
        payload
            .get("raw")
            .filter(|raw| raw.is_object())
            .and_then(extract_month)
            .or_else(|| extract_month(payload))
    });
    from_payload.or_else(|| click.active_label.as_deref().and_then(parse_month_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::month_records;
    use serde_json::json;

    #[test]
    fn axis_labels_truncate_without_touching_names() {
        let rows = vec![CategoryRow {
            label: "Extra Long Book Name Volume 2".to_string(),
            value: 1.0,
            raw: json!({}),
        }];
        let points = category_points(&rows, AXIS_LABEL_MAX);
        assert_eq!(points[0].axis_label, "Extra Long Book Na…");
        assert_eq!(points[0].name, "Extra Long Book Name Volume 2");
        assert_eq!(rows[0].label, "Extra Long Book Name Volume 2");
    }

    #[test]
    fn axis_label_counts_chars_not_bytes() {
        assert_eq!(axis_label("Çeşitli Müşteri", 6), "Çeşitl…");
        assert_eq!(axis_label("Short", 6), "Short");
    }

    #[test]
    fn mini_bar_takes_first_six() {
        let rows: Vec<CategoryRow> = (0..9)
            .map(|i| CategoryRow { label: format!("Customer {i}"), value: i as f64, raw: json!({}) })
            .collect();
        let dataset = category_mini_bar(CategoryKey::Customer, &rows);
        assert_eq!(dataset.kind, ChartKind::MiniBar);
        assert_eq!(dataset.points.len(), MINI_BAR_LIMIT);
        assert_eq!(dataset.points[0].axis_label, "Custom…");
    }

    #[test]
    fn year_click_decodes_label_then_payload() {
        let click = ChartClick { active_label: Some("2023".into()), payload: None };
        assert_eq!(decode_year_click(&click), Some(2023));

        let point = &year_points(&[YearRecord { year: 2022, production_total: 5.0 }])[0];
        let click = ChartClick { active_label: None, payload: serde_json::to_value(point).ok() };
        assert_eq!(decode_year_click(&click), Some(2022));

        let click = ChartClick { active_label: Some("Total".into()), payload: None };
        assert_eq!(decode_year_click(&click), None);
        assert_eq!(decode_year_click(&ChartClick::default()), None);
    }

    #[test]
    fn month_click_round_trips_through_the_chart() {
        let months = month_records(&[
            json!({"MonthNo": 3, "MonthName": "March", "Production": 40}),
            json!({"Month": 11, "Production": 60}),
        ]);
        for (record, point) in months.iter().zip(month_points(&months)) {
            let click = ChartClick::on_point(&point);
            assert_eq!(decode_month_click(&click), record.month_number);
        }
    }

    #[test]
    fn month_click_falls_back_to_names() {
        let click = ChartClick { active_label: None, payload: Some(json!({"name": "Aug", "value": 3})) };
        assert_eq!(decode_month_click(&click), Some(8));

        let click = ChartClick { active_label: Some("feb".into()), payload: None };
        assert_eq!(decode_month_click(&click), Some(2));

        let click = ChartClick { active_label: Some("Closing".into()), payload: None };
        assert_eq!(decode_month_click(&click), None);
    }

    #[test]
    fn click_on_label_only_month_selects_nothing() {
        let months = month_records(&[json!({"MonthName": "Closing", "Production": 1})]);
        let point = &month_points(&months)[0];
        assert_eq!(decode_month_click(&ChartClick::on_point(point)), None);
    }

    #[test]
    fn datasets_are_titled_by_mode() {
        let dataset = year_dataset(&[], "Stock");
        assert_eq!(dataset.title, "Yearly Stock");
        assert!(dataset.is_empty());
        assert_eq!(category_dataset(CategoryKey::Book, &[], "Production").title, "Book Wise Production");
    }
}
