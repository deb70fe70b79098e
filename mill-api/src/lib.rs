//! Core wire types and the data source contract for the mill dashboard.
//!
//! This crate provides:
//! - `row`: raw backend rows, data modes, row kinds and breakdown category keys
//! - `source`: the `DataSource` and `CredentialStore` traits the drill-down
//!   orchestrator consumes
//! - `config`: environment-driven API configuration
//! - `http`: a `reqwest` implementation of `DataSource` (feature `api`)

pub mod config;
pub mod error;
#[cfg(feature = "api")]
pub mod http;
pub mod row;
pub mod source;

pub use error::{ApiError, Result};
pub use row::{CategoryKey, DataMode, FetchParams, RawRow, RowKind};
pub use source::{CredentialStore, DataSource, StaticCredentials};
