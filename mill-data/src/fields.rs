//! Case-insensitive field lookup and the only coercion rows get: numeric
//! strings to numbers.

use serde_json::{Map, Value};

/// Fields that carry a row's measured quantity.
pub(crate) const VALUE_FIELDS: [&str; 3] = ["production", "value", "stock"];

/// Values of the fields named in `names`, in `names` order, skipping nulls.
pub(crate) fn named<'a>(
    row: &'a Map<String, Value>,
    names: &'a [&'a str],
) -> impl Iterator<Item = &'a Value> + 'a {
    names.iter().filter_map(move |name| {
        row.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
            .filter(|value| !value.is_null())
    })
}

pub(crate) fn is_value_field(key: &str) -> bool {
    VALUE_FIELDS.iter().any(|name| key.eq_ignore_ascii_case(name))
}

/// A finite number from a JSON number or a numeric string.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// An integral number from a JSON number or a numeric string.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    let number = as_number(value)?;
    (number.fract() == 0.0 && number.abs() < i64::MAX as f64).then_some(number as i64)
}

/// A non-empty, trimmed text rendering of a string or number value.
pub(crate) fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(match as_integer(value) {
            Some(i) => i.to_string(),
            None => n.to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_ignores_case_and_nulls() {
        let row = json!({"FnYear": null, "YEAR": 2024});
        let row = row.as_object().unwrap();
        let found: Vec<&Value> = named(row, &["fnYear", "year"]).collect();
        assert_eq!(found, vec![&json!(2024)]);
    }

    #[test]
    fn numeric_strings_coerce() {
        assert_eq!(as_number(&json!(" 250 ")), Some(250.0));
        assert_eq!(as_number(&json!("12.5")), Some(12.5));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!("inf")), None);
        assert_eq!(as_number(&json!(true)), None);
        assert_eq!(as_integer(&json!(3.5)), None);
        assert_eq!(as_integer(&json!("2024")), Some(2024));
    }

    #[test]
    fn text_renders_integral_numbers_plainly() {
        assert_eq!(as_text(&json!(17)), Some("17".to_string()));
        assert_eq!(as_text(&json!(17.0)), Some("17".to_string()));
        assert_eq!(as_text(&json!("  ")), None);
    }
}
