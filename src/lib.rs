//! Cargo stowage advisor for a space-station inventory.
//!
//! The engine modules (`search`, `placement`, `rearrangement`, `lifecycle`,
//! `waste`) are pure functions over item and container snapshots. `inventory`
//! applies their advice to a snapshot and records action-log entries; `api`
//! exposes everything over HTTP.

pub mod api;
pub mod config;
pub mod engine;
pub mod inventory;
pub mod lifecycle;
pub mod model;
pub mod placement;
pub mod rearrangement;
pub mod search;
pub mod telemetry;
pub mod types;
pub mod waste;
