//! # ffgeo-ip: first-filing imputation pipeline
//!
//! Reads a snapshot of the bibliographic store, classifies first filings,
//! builds their donor pools and imputes missing locations and country codes
//! from the strongest available donor.
//!
//! Stage order: `corpus` -> `resolver` -> `pool` -> `impute` (using
//! `tie_break`) -> `bridge` -> `db::outputs`. `pipeline` wires them together.

pub mod bridge;
pub mod corpus;
pub mod db;
pub mod impute;
pub mod pipeline;
pub mod pool;
pub mod resolver;
pub mod summary;
pub mod tie_break;

#[cfg(test)]
mod testing;

pub use pipeline::{run_on_store, run_pipeline, PipelineOptions, PipelineOutput};
pub use summary::RunSummary;
