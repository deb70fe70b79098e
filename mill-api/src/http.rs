//! `reqwest` implementation of [`DataSource`].
//!
//! Works on native targets (inside a tokio runtime) and in the browser
//! (reqwest drives `fetch` on `wasm32`). The request timeout is only applied
//! natively; the browser owns fetch timeouts.

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::row::{DataMode, FetchParams, RawRow};
use crate::source::{CredentialStore, DataSource};
use log::{debug, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

pub struct HttpDataSource<C> {
    client: Client,
    config: ApiConfig,
    credentials: C,
}

impl<C: CredentialStore> HttpDataSource<C> {
    pub fn new(config: ApiConfig, credentials: C) -> Result<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        let client = builder.build()?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response.
    ///
    /// A 401 clears the stored credential before surfacing
    /// [`ApiError::Unauthorized`]; the caller must not retry.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<String> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("[Mill] {} rejected with 401", what);
            self.credentials.clear();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            warn!("[Mill] {} failed with status {}", what, status);
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

impl<C: CredentialStore> DataSource for HttpDataSource<C> {
    async fn fetch_rows(&self, mode: DataMode, params: FetchParams) -> Result<Vec<RawRow>> {
        let url = self.config.url(mode.data_path());
        let what = format!("{} {} rows", mode, params.kind);
        let request = self.client.post(&url).json(&params.to_payload());
        let body = self.send(request, &what).await?;
        let rows = parse_rows_envelope(&body)?;
        debug!("[Mill] {} returned {} rows", what, rows.len());
        Ok(rows)
    }

    async fn fetch_tiles(&self, mode: DataMode) -> Result<Option<RawRow>> {
        let url = self.config.url(mode.tiles_path());
        let what = format!("{} tiles", mode);
        let body = self.send(self.client.get(&url), &what).await?;
        parse_tiles_envelope(&body)
    }
}

/// Extract the row list from a `{ "data": [...] }` envelope.
///
/// A missing or non-array `data` is an empty result, as is an empty body.
/// A bare top-level array is accepted as the row list itself.
pub fn parse_rows_envelope(body: &str) -> Result<Vec<RawRow>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(body)?;
    Ok(match value {
        Value::Array(rows) => rows,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    })
}

/// Extract the tiles object from a `{ "data": {...} }` envelope.
pub fn parse_tiles_envelope(body: &str) -> Result<Option<RawRow>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body)?;
    Ok(match value {
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(tiles @ Value::Object(_)) => Some(tiles),
            _ => None,
        },
        _ => None,
    })
}
