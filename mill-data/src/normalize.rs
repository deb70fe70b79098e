//! Row normalizer.
//!
//! Every backend row is parsed against the role it plays in the drill-down
//! (year, month or a breakdown category). Each field is tried through an
//! ordered list of extractors: known field names first, then a heuristic
//! scan. An extractor that finds nothing yields `None` and the next one runs;
//! the only coercion applied is numeric-string parsing.
//!
//! All functions here are pure: the same row always normalizes the same way.

use crate::fields::{as_integer, as_number, as_text, is_value_field, named, VALUE_FIELDS};
use mill_api::{CategoryKey, RawRow};
use mill_utils::months::{is_valid_month, month_abbreviation, month_from_name};
use serde::Serialize;
use serde_json::{Map, Value};
use std::ops::Range;

/// Years accepted by the heuristic scan.
pub const YEAR_SCAN_RANGE: Range<i64> = 1900..2100;

const YEAR_FIELDS: [&str; 2] = ["fnYear", "year"];
const MONTH_NUMBER_FIELDS: [&str; 4] = ["month", "monthNo", "month_no", "monthNumber"];
const MONTH_NAME_FIELDS: [&str; 4] = ["monthName", "month_name", "month", "name"];

/// What a row is being parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Year,
    Month,
    /// A breakdown row; `index` is its position in the fetched list and
    /// feeds the placeholder label.
    Category { key: CategoryKey, index: usize },
}

/// The chart-ready form of any row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_number: Option<u32>,
    pub raw: RawRow,
}

/// Normalize `raw` for `role`, or `None` when no usable name can be found.
pub fn normalize(raw: &RawRow, role: Role) -> Option<CanonicalRecord> {
    match role {
        Role::Year => {
            let year = extract_year(raw)?;
            Some(CanonicalRecord {
                name: year.to_string(),
                value: extract_total(raw),
                month_number: None,
                raw: raw.clone(),
            })
        }
        Role::Month => {
            let month_number = extract_month(raw);
            let name = month_label(raw, month_number)?;
            Some(CanonicalRecord {
                name,
                value: extract_total(raw),
                month_number,
                raw: raw.clone(),
            })
        }
        Role::Category { key, index } => {
            if !matches!(raw, Value::Object(_) | Value::String(_) | Value::Number(_)) {
                return None;
            }
            Some(CanonicalRecord {
                name: category_label(raw, key, index),
                value: extract_value(raw),
                month_number: None,
                raw: raw.clone(),
            })
        }
    }
}

/// The year a row describes.
///
/// Named `fnYear`/`year` fields win. Without them, the first field (value
/// fields excluded) holding a four-digit year in [1900, 2100) is taken.
pub fn extract_year(raw: &RawRow) -> Option<i32> {
    match raw {
        Value::Object(row) => named_year(row).or_else(|| scanned_year(row)),
        scalar => scan_year_value(scalar),
    }
}

fn named_year(row: &Map<String, Value>) -> Option<i32> {
    named(row, &YEAR_FIELDS)
        .filter_map(as_integer)
        .find(|year| *year > 0)
        .and_then(|year| i32::try_from(year).ok())
}

fn scanned_year(row: &Map<String, Value>) -> Option<i32> {
    row.iter()
        .filter(|(key, _)| !is_value_field(key))
        .find_map(|(_, value)| scan_year_value(value))
}

fn scan_year_value(value: &Value) -> Option<i32> {
    let year = match value {
        Value::Number(_) => as_integer(value)?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            trimmed.parse::<i64>().ok()?
        }
        _ => return None,
    };
    if YEAR_SCAN_RANGE.contains(&year) {
        i32::try_from(year).ok()
    } else {
        None
    }
}

/// The month number (1..=12) a row describes.
///
/// Numeric `month`/`monthNo`/`monthNumber` fields win; otherwise a month
/// name field must hold an exact abbreviation ("Mar") or full name ("March").
/// Anything else is `None`, never a default.
pub fn extract_month(raw: &RawRow) -> Option<u32> {
    match raw {
        Value::Object(row) => named_month_number(row).or_else(|| named_month_name(row)),
        Value::String(s) => parse_month_text(s),
        scalar => month_from_number(scalar),
    }
}

/// Parse free text the same way month name fields are parsed: a number in
/// 1..=12 or a month name.
pub fn parse_month_text(text: &str) -> Option<u32> {
    month_from_number(&Value::String(text.to_string())).or_else(|| month_from_name(text))
}

fn named_month_number(row: &Map<String, Value>) -> Option<u32> {
    named(row, &MONTH_NUMBER_FIELDS).find_map(month_from_number)
}

fn named_month_name(row: &Map<String, Value>) -> Option<u32> {
    named(row, &MONTH_NAME_FIELDS)
        .filter_map(Value::as_str)
        .find_map(month_from_name)
}

fn month_from_number(value: &Value) -> Option<u32> {
    let month = u32::try_from(as_integer(value)?).ok()?;
    is_valid_month(month).then_some(month)
}

fn month_label(raw: &RawRow, month_number: Option<u32>) -> Option<String> {
    let named_label = match raw {
        Value::Object(row) => named(row, &["monthName", "month_name"]).find_map(as_text),
        _ => None,
    };
    named_label.or_else(|| month_number.and_then(month_abbreviation).map(str::to_string))
}

/// A breakdown row's quantity: a value field, else the first numeric field,
/// else 0. Negative values pass through unchanged.
pub fn extract_value(raw: &RawRow) -> f64 {
    match raw {
        Value::Object(row) => named_total(row)
            .or_else(|| row.values().find(|v| v.is_number()).and_then(as_number))
            .unwrap_or(0.0),
        Value::Number(_) => as_number(raw).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// A year or month row's total: a value field, else 0.
pub fn extract_total(raw: &RawRow) -> f64 {
    match raw {
        Value::Object(row) => named_total(row).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn named_total(row: &Map<String, Value>) -> Option<f64> {
    named(row, &VALUE_FIELDS).find_map(as_number)
}

/// Known name fields per category, most specific first.
pub fn label_fields(key: CategoryKey) -> &'static [&'static str] {
    match key {
        CategoryKey::Book => &["Book_Name", "BookName", "Book", "Name"],
        CategoryKey::Beam => &["Beam_No", "BeamNo", "Beam_Id", "BeamId", "Beam", "Name"],
        CategoryKey::Item => &["Item_Name", "ItemName", "Item", "Name"],
        CategoryKey::Selvage => &["Selvage_Name", "SelvageName", "Selvage", "Name"],
        CategoryKey::Factory => &["Factory_Name", "FactoryName", "Factory", "Name"],
        CategoryKey::Customer => &[
            "Customer_Name",
            "CustomerName",
            "Party_Name",
            "PartyName",
            "Customer",
            "Name",
        ],
    }
}

/// A breakdown row's display label; never empty.
///
/// Known name fields first, then the first non-empty string field that is
/// not a value field, then the positional placeholder `R<n>` (1-based).
pub fn category_label(raw: &RawRow, key: CategoryKey, index: usize) -> String {
    let found = match raw {
        Value::Object(row) => named(row, label_fields(key))
            .find_map(as_text)
            .or_else(|| {
                row.iter()
                    .filter(|(field, value)| value.is_string() && !is_value_field(field))
                    .find_map(|(_, value)| as_text(value))
            }),
        Value::String(_) => as_text(raw),
        _ => None,
    };
    found.unwrap_or_else(|| placeholder_label(index))
}

pub fn placeholder_label(index: usize) -> String {
    format!("R{}", index + 1)
}
