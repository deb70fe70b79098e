use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A record exactly as the backend sent it.
///
/// Backend rows have no fixed schema: field names drift between endpoints
/// (`FnYear` vs `Year`, `MonthNo` vs `Month`), numbers sometimes arrive as
/// strings, and some endpoints answer with bare scalars. Interpretation is
/// left to the row normalizer.
pub type RawRow = serde_json::Value;

/// Which backend data set the dashboard reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    #[default]
    Production,
    Stock,
}

impl DataMode {
    pub const ALL: [DataMode; 2] = [DataMode::Production, DataMode::Stock];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::Production => "production",
            DataMode::Stock => "stock",
        }
    }

    /// Human-readable tab title.
    pub fn title(&self) -> &'static str {
        match self {
            DataMode::Production => "Production",
            DataMode::Stock => "Stock",
        }
    }

    /// Relative path of the row endpoint (POST).
    pub fn data_path(&self) -> &'static str {
        match self {
            DataMode::Production => "/Production/GetProductionData",
            DataMode::Stock => "/Stock/GetStockData",
        }
    }

    /// Relative path of the KPI tiles endpoint (GET).
    pub fn tiles_path(&self) -> &'static str {
        match self {
            DataMode::Production => "/Production/GetProductionTiles",
            DataMode::Stock => "/Stock/GetStockTiles",
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(DataMode::Production),
            "stock" => Ok(DataMode::Stock),
            other => Err(format!("unknown data mode '{other}' (expected production or stock)")),
        }
    }
}

/// The six breakdown categories sliced by year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKey {
    Book,
    Beam,
    Item,
    Selvage,
    Factory,
    Customer,
}

impl CategoryKey {
    /// Every category, in dashboard display order.
    pub const ALL: [CategoryKey; 6] = [
        CategoryKey::Book,
        CategoryKey::Beam,
        CategoryKey::Item,
        CategoryKey::Selvage,
        CategoryKey::Factory,
        CategoryKey::Customer,
    ];

    /// The `type` value the backend expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Book => "book",
            CategoryKey::Beam => "beam",
            CategoryKey::Item => "item",
            CategoryKey::Selvage => "selvage",
            CategoryKey::Factory => "factory",
            CategoryKey::Customer => "customer",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CategoryKey::Book => "Book",
            CategoryKey::Beam => "Beam",
            CategoryKey::Item => "Item",
            CategoryKey::Selvage => "Selvage",
            CategoryKey::Factory => "Factory",
            CategoryKey::Customer => "Customer",
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CategoryKey::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// The role a fetched row plays in the drill-down hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Year,
    Month,
    Category(CategoryKey),
}

impl RowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowKind::Year => "year",
            RowKind::Month => "month",
            RowKind::Category(key) => key.as_str(),
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one row fetch.
///
/// `year = None` means unfiltered; `month = None` means the whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchParams {
    pub kind: RowKind,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl FetchParams {
    pub fn years() -> Self {
        Self {
            kind: RowKind::Year,
            year: None,
            month: None,
        }
    }

    pub fn months(year: i32) -> Self {
        Self {
            kind: RowKind::Month,
            year: Some(year),
            month: None,
        }
    }

    pub fn category(key: CategoryKey, year: i32, month: Option<u32>) -> Self {
        Self {
            kind: RowKind::Category(key),
            year: Some(year),
            month,
        }
    }

    /// The JSON request body. The backend uses `0` for "no filter".
    pub fn to_payload(&self) -> RequestPayload {
        RequestPayload {
            kind: self.kind.as_str().to_string(),
            fn_year: self.year.unwrap_or(0),
            month: self.month.unwrap_or(0),
        }
    }
}

/// Request body accepted by the row endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "fnYear")]
    pub fn_year: i32,
    pub month: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_zero_for_missing_filters() {
        let payload = FetchParams::years().to_payload();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "year", "fnYear": 0, "month": 0 }));
    }

    #[test]
    fn category_payload_carries_year_and_month() {
        let payload = FetchParams::category(CategoryKey::Selvage, 2024, Some(5)).to_payload();
        assert_eq!(payload.kind, "selvage");
        assert_eq!(payload.fn_year, 2024);
        assert_eq!(payload.month, 5);
    }

    #[test]
    fn category_keys_parse_case_insensitively() {
        assert_eq!("Customer".parse::<CategoryKey>(), Ok(CategoryKey::Customer));
        assert!("loom".parse::<CategoryKey>().is_err());
    }

    #[test]
    fn data_mode_parses_and_routes() {
        let mode: DataMode = "STOCK".parse().unwrap();
        assert_eq!(mode, DataMode::Stock);
        assert_eq!(mode.data_path(), "/Stock/GetStockData");
        assert_eq!(DataMode::Production.tiles_path(), "/Production/GetProductionTiles");
    }
}
