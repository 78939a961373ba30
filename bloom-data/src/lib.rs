//! Bloom onset estimation and anomaly aggregation.
//!
//! This crate turns normalized flowering observations into per-group
//! onsets and baselines, classifies the current season against them and
//! rolls the result up to species and regional status.

pub mod aggregate;
pub mod anomaly;
pub mod baseline;
pub mod config;
pub mod fallback;
pub mod onset;
pub mod pipeline;
pub mod report;
pub mod rounding;
pub mod select;
pub mod stats;
pub mod status;
pub mod trend;

pub use config::AnalysisConfig;
pub use pipeline::analyze;
pub use report::BloomReport;
pub use status::BloomStatus;
