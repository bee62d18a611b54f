//! Core data types and analytics for Non-Revenue Water (NRW) dashboards
//!
//! This crate turns periodic water-balance snapshots per District Metered
//! Area into a per-zone loss ranking and fleet-wide KPIs. Everything here is
//! pure: callers load snapshots and zones, pick the reference date, and call
//! [`compute_dashboard`].

pub mod balance;
pub mod engine;
pub mod grouping;
pub mod ingest;
pub mod kpi;
pub mod pipeline;
pub mod ranking;
pub mod sparkline;
pub mod trend;
pub mod types;

pub use balance::*;
pub use engine::*;
pub use grouping::*;
pub use ingest::*;
pub use kpi::*;
pub use pipeline::*;
pub use ranking::*;
pub use sparkline::*;
pub use trend::*;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The call itself is malformed (e.g. a payload that is not a collection)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single record could not be mapped to a typed value
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
