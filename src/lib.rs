//! Weather-regime inference for natural-gas market signals.
//!
//! Fetches GFS 2m temperature-anomaly images, classifies each one's thermal
//! signal from its mean colour, and rolls the 16-day horizon into a regime
//! summary for downstream pricing and commentary.

pub mod classify;
pub mod collect;
pub mod config;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod output;
pub mod pipeline;
pub mod regime;
pub mod report;
pub mod run;
