//! # ffgeo Common Library
//!
//! Shared code for the first-filing geography pipeline:
//! - Error type
//! - Configuration loading (TOML bootstrap + study parameters)
//! - Domain model (filings, relationships, person locations, imputed records)
//! - Backing-store schema declarations, validation and connection setup

pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use error::{Error, Result};
