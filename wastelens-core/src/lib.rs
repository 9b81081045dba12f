//! Core types and pipeline wiring for the wastelens collection analytics dashboard.

/// Two-level reduction of pickup records into household, district, and city statistics.
pub mod aggregate;
/// Errors raised by the generation and aggregation pipeline.
pub mod error;
/// Simulated IoT pickup records.
pub mod generator;
/// Domain models shared by the pipeline, advisors, and dashboards.
pub mod model;
/// Traits and configuration describing advisory-insight backends.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;
/// Read-only projections consumed by presentation layers.
pub mod view;

pub use aggregate::*;
pub use error::*;
pub use generator::*;
pub use model::*;
pub use ports::*;
pub use service::*;
pub use view::*;
