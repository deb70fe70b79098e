//! Drill-down orchestration for the mill dashboard.
//!
//! This crate provides:
//! - `group`: the six-way category breakdown fetch
//! - `state`: the explicit dashboard state and its pure transitions
//! - `fence`: generation tokens used to drop stale fetch results
//! - `orchestrator`: the async driver that pairs each transition with its fetches
//!   and publishes snapshots to observers

pub mod config;
pub mod fence;
pub mod group;
pub mod orchestrator;
pub mod state;

pub use config::DrillConfig;
pub use group::fetch_categories;
pub use orchestrator::{Orchestrator, Subscription};
pub use state::{DashboardSnapshot, DrillState, LoadingFlags, Phase, Selection};
