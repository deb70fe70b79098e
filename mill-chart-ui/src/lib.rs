//! Shared Dioxus components and D3.js bridge for the mill dashboard.
//!
//! This crate provides:
//! - `js_bridge`: Rust wrappers for D3.js chart functions via `js_sys::eval()`
//! - `state`: Reactive AppState with Dioxus Signals, fed by orchestrator snapshots
//! - `credentials`: the `localStorage`-backed bearer credential
//! - `components`: Reusable RSX components (tabs, KPI tiles, containers, etc.)

pub mod components;
pub mod credentials;
pub mod js_bridge;
pub mod state;
