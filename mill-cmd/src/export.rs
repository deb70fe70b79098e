//! `export`: write every breakdown of the selected period to CSV.

use crate::drill::load_snapshot;
use crate::DrillArgs;
use log::{info, warn};
use mill_api::config::ApiConfig;
use mill_api::CategoryKey;
use mill_data::CategoryResultSet;
use mill_drill::Phase;
use std::io::Write;

pub async fn run_export(config: ApiConfig, target: &DrillArgs, out: &str) -> anyhow::Result<()> {
    let snapshot = load_snapshot(config, target, CategoryKey::Book).await?;
    if snapshot.phase == Phase::NoData {
        warn!("No {} data; writing an empty export", target.mode);
    }
    for key in snapshot.categories.failed_keys() {
        warn!("{} breakdown failed to load; exported without rows", key);
    }

    let file = std::fs::File::create(out)?;
    let written = write_categories(file, &snapshot.categories)?;
    info!(
        "Exported {} rows for {:?}/{:?} to {}",
        written, snapshot.selection.year, snapshot.selection.month, out
    );
    Ok(())
}

/// Write `category,label,value` rows in category order. Returns the number
/// of data rows written.
pub fn write_categories<W: Write>(writer: W, categories: &CategoryResultSet) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["category", "label", "value"])?;
    let mut written = 0;
    for (key, rows) in categories.iter() {
        for row in rows {
            wtr.write_record([key.as_str(), row.label.as_str(), &row.value.to_string()])?;
            written += 1;
        }
    }
    wtr.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mill_data::records::{CategoryRow, FetchFailure};
    use serde_json::json;

    fn row(label: &str, value: f64) -> CategoryRow {
        CategoryRow { label: label.into(), value, raw: json!({}) }
    }

    #[test]
    fn writes_header_and_rows_in_category_order() {
        let mut set = CategoryResultSet::empty();
        set.insert(CategoryKey::Customer, vec![row("Acme, Ltd", 12.5)]);
        set.insert(CategoryKey::Book, vec![row("Atlas", 250.0), row("Ledger", -3.0)]);
        set.mark_failed(CategoryKey::Beam, FetchFailure::Transport);

        let mut buf = Vec::new();
        let written = write_categories(&mut buf, &set).unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "category,label,value\nbook,Atlas,250\nbook,Ledger,-3\ncustomer,\"Acme, Ltd\",12.5\n"
        );
    }

    #[test]
    fn empty_set_writes_only_the_header() {
        let mut buf = Vec::new();
        assert_eq!(write_categories(&mut buf, &CategoryResultSet::empty()).unwrap(), 0);
        assert_eq!(String::from_utf8(buf).unwrap(), "category,label,value\n");
    }
}
