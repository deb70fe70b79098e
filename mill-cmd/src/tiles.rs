//! `tiles`: print the KPI tiles endpoint.

use mill_api::config::ApiConfig;
use mill_api::http::HttpDataSource;
use mill_api::{DataMode, DataSource, StaticCredentials};
use mill_data::summary::MISSING;
use mill_data::Tiles;
use mill_utils::numbers::format_thousands;

pub async fn run_tiles(config: ApiConfig, mode: DataMode) -> anyhow::Result<()> {
    let source = HttpDataSource::new(config.clone(), StaticCredentials::new(config.token))?;
    let raw = source.fetch_tiles(mode).await?;
    match raw.as_ref().and_then(Tiles::from_raw) {
        Some(tiles) => print!("{}", render_tiles(mode, &tiles)),
        None => println!("No {} tiles available.", mode.as_str()),
    }
    Ok(())
}

pub fn render_tiles(mode: DataMode, tiles: &Tiles) -> String {
    let noun = mode.title();
    [
        (format!("Year {noun}"), &tiles.year_label, tiles.yearly_total),
        (format!("Month {noun}"), &tiles.month_label, tiles.monthly_total),
        (format!("Week {noun}"), &tiles.week_label, tiles.weekly_total),
        (format!("Today {noun}"), &tiles.day_label, tiles.daily_total),
    ]
    .into_iter()
    .map(|(title, label, value)| {
        let value = value.map(format_thousands).unwrap_or_else(|| MISSING.to_string());
        format!("{title:<18} {value:>14}  {label}\n")
    })
    .collect()
}
