//! API configuration resolved from the environment.

use crate::error::{ApiError, Result};
use std::time::Duration;

pub const BASE_URL_VAR: &str = "MILL_API_BASE_URL";
pub const TOKEN_VAR: &str = "MILL_API_TOKEN";
pub const TIMEOUT_VAR: &str = "MILL_API_TIMEOUT_SECS";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    /// Bearer token, if the user is signed in.
    pub token: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            token: None,
        })
    }

    /// Build from `MILL_API_BASE_URL`, `MILL_API_TOKEN` and
    /// `MILL_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .ok_or_else(|| ApiError::Config(format!("{BASE_URL_VAR} is not set")))?;
        let mut config = Self::new(&base_url)?;
        config.token = lookup(TOKEN_VAR).filter(|t| !t.trim().is_empty());
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ApiError::Config(format!("{TIMEOUT_VAR} must be a whole number of seconds, got '{raw}'"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Full URL for an endpoint path such as `/Stock/GetStockData`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ApiError::Config(format!(
            "base URL must start with http:// or https://, got '{raw}'"
        )));
    }
    Ok(trimmed.to_string())
}
