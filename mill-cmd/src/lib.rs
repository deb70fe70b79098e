//! Command implementations for the mill CLI.
//!
//! Provides subcommands that run the drill-down orchestrator against a live
//! backend and print or export what it loaded.

use clap::{Args, Subcommand};
use mill_api::config::{ApiConfig, BASE_URL_VAR, TIMEOUT_VAR, TOKEN_VAR};
use mill_api::{CategoryKey, DataMode};

pub mod drill;
pub mod export;
pub mod tiles;

/// Connection flags. Each one overrides its environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Backend base URL [env: MILL_API_BASE_URL]
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token [env: MILL_API_TOKEN]
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds [env: MILL_API_TIMEOUT_SECS, default 15]
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl ConnectionArgs {
    /// Resolve flags over the process environment.
    pub fn resolve(&self) -> anyhow::Result<ApiConfig> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve flags over `env`.
    pub fn resolve_with<F>(&self, env: F) -> anyhow::Result<ApiConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig::from_lookup(|name| {
            let flag = match name {
                BASE_URL_VAR => self.base_url.clone(),
                TOKEN_VAR => self.token.clone(),
                TIMEOUT_VAR => self.timeout_secs.map(|secs| secs.to_string()),
                _ => None,
            };
            flag.or_else(|| env(name))
        })?;
        Ok(config)
    }
}

/// Which slice of the drill-down to load.
#[derive(Args, Debug, Clone, Default)]
pub struct DrillArgs {
    /// Data source: production or stock
    #[arg(short, long, default_value = "production")]
    pub mode: DataMode,

    /// Year to drill into (default: the latest year)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Month to drill into, 1-12 (default: the latest month of the year)
    #[arg(long)]
    pub month: Option<u32>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the dashboard and print years, months, a breakdown and the KPIs
    Drill {
        #[command(flatten)]
        target: DrillArgs,

        /// Breakdown to print: book, beam, item, selvage, factory or customer
        #[arg(short, long, default_value = "book")]
        category: CategoryKey,

        /// Print the full dashboard snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write every breakdown of the selected period to CSV
    Export {
        #[command(flatten)]
        target: DrillArgs,

        /// Output CSV path
        #[arg(short, long)]
        out: String,
    },

    /// Print the KPI tiles
    Tiles {
        /// Data source: production or stock
        #[arg(short, long, default_value = "production")]
        mode: DataMode,
    },
}

pub async fn run(connection: ConnectionArgs, command: Command) -> anyhow::Result<()> {
    let config = connection.resolve()?;
    match command {
        Command::Drill {
            target,
            category,
            json,
        } => drill::run_drill(config, &target, category, json).await,
        Command::Export { target, out } => export::run_export(config, &target, &out).await,
        Command::Tiles { mode } => tiles::run_tiles(config, mode).await,
    }
}
