//! The contract between the drill-down orchestrator and the backend.

use crate::error::Result;
use crate::row::{DataMode, FetchParams, RawRow};
use std::future::Future;
use std::rc::Rc;
use std::sync::RwLock;

/// Something that can answer row and tile queries.
///
/// Futures are not required to be `Send`: the dashboard runs on a
/// single-threaded executor (the browser event loop, or a current-thread
/// runtime in the CLI).
pub trait DataSource {
    /// Fetch the raw rows for one (kind, year, month) slice of `mode`.
    fn fetch_rows(
        &self,
        mode: DataMode,
        params: FetchParams,
    ) -> impl Future<Output = Result<Vec<RawRow>>>;

    /// Fetch the raw KPI tiles object for `mode`. `Ok(None)` means the
    /// backend has no tiles for this mode.
    fn fetch_tiles(&self, mode: DataMode) -> impl Future<Output = Result<Option<RawRow>>>;
}

impl<T: DataSource> DataSource for Rc<T> {
    fn fetch_rows(
        &self,
        mode: DataMode,
        params: FetchParams,
    ) -> impl Future<Output = Result<Vec<RawRow>>> {
        (**self).fetch_rows(mode, params)
    }

    fn fetch_tiles(&self, mode: DataMode) -> impl Future<Output = Result<Option<RawRow>>> {
        (**self).fetch_tiles(mode)
    }
}

/// Supplies the bearer credential attached to every fetch.
///
/// On an authorization failure the data source calls [`clear`](Self::clear);
/// implementations that live in a browser also send the user to the login
/// page from there.
pub trait CredentialStore {
    fn token(&self) -> Option<String>;
    fn clear(&self);
}

/// In-memory credential, used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: RwLock<Option<String>>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }
}

impl CredentialStore for StaticCredentials {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn clear(&self) {
        log::warn!("[Mill] Clearing rejected credential");
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}
