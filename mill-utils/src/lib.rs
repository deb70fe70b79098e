//! Shared utility functions for mill crates.

/// Month name table shared by row parsing and click decoding.
pub mod months {
    /// Short month names, January first.
    pub const MONTH_ABBREVIATIONS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// "Jan" for 1 through "Dec" for 12.
    pub fn month_abbreviation(month: u32) -> Option<&'static str> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        MONTH_ABBREVIATIONS.get(index).copied()
    }

    /// Full month names, January first.
    pub const MONTH_NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
        "November", "December",
    ];

    /// Map an exact month abbreviation or full name to its number,
    /// case-insensitively ("mar" and "MARCH" both give 3, "Marketing" none).
    pub fn month_from_name(name: &str) -> Option<u32> {
        let name = name.trim();
        MONTH_ABBREVIATIONS
            .iter()
            .zip(MONTH_NAMES.iter())
            .position(|(abbr, full)| abbr.eq_ignore_ascii_case(name) || full.eq_ignore_ascii_case(name))
            .map(|index| index as u32 + 1)
    }

    pub fn is_valid_month(month: u32) -> bool {
        (1..=12).contains(&month)
    }

}

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{NaiveDate, NaiveDateTime};

    /// Parse a backend date such as "2024-03-05", "2024-03-05T10:30:00" or
    /// "2024-03-05T10:30:00.000Z".
    pub fn parse_backend_date(raw: &str) -> Result<NaiveDate, DateError> {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(date);
        }
        let without_zone = trimmed.trim_end_matches('Z');
        let without_fraction = without_zone.split('.').next().unwrap_or(without_zone);
        NaiveDateTime::parse_from_str(without_fraction, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(without_fraction, "%Y-%m-%d %H:%M:%S"))
            .map(|dt| dt.date())
            .map_err(|_| DateError(format!("unrecognized date '{raw}'")))
    }

    /// Render a date the way the tiles row labels a day: "Tue Mar 05 2024".
    pub fn day_label(date: &NaiveDate) -> String {
        date.format("%a %b %d %Y").to_string()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_backend_date() {
            let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
            assert_eq!(parse_backend_date("2024-03-05").unwrap(), expected);
            assert_eq!(parse_backend_date("2024-03-05T10:30:00").unwrap(), expected);
            assert_eq!(parse_backend_date("2024-03-05T10:30:00.123Z").unwrap(), expected);
            assert!(parse_backend_date("yesterday").is_err());
        }

        #[test]
        fn test_day_label() {
            let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
            assert_eq!(day_label(&date), "Tue Mar 05 2024");
        }
    }
}

/// Number formatting for tiles and tooltips.
pub mod numbers {
    /// Group thousands with commas; keep up to two decimals for fractional
    /// values ("1,234,567", "1,234.5").
    pub fn format_thousands(value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let rounded = (value * 100.0).round() / 100.0;
        let negative = rounded < 0.0;
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let fraction = fraction.trim_end_matches('0');
        let sign = if negative { "-" } else { "" };
        if fraction.is_empty() {
            format!("{sign}{grouped}")
        } else {
            format!("{sign}{grouped}.{fraction}")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_format_thousands() {
            assert_eq!(format_thousands(0.0), "0");
            assert_eq!(format_thousands(999.0), "999");
            assert_eq!(format_thousands(1234567.0), "1,234,567");
            assert_eq!(format_thousands(1234.5), "1,234.5");
            assert_eq!(format_thousands(-4200.256), "-4,200.26");
        }
    }
}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
