//! View rendering shared by the role pages.
//!
//! Renderers take an already-decoded snapshot and paint it. None of them
//! fetches, so a cycle can only reach the DOM after its fetch has settled.

pub mod alerts;
pub mod charts;
pub mod metrics;
pub mod tables;
pub mod tier;

pub use metrics::{update_metric, MetricUpdate};
pub use tier::SeverityTier;
