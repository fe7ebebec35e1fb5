//! LCX engine library
//!
//! Location context enrichment for Dutch addresses: resolves free-text input
//! or listing URLs through PDOK, gathers neighborhood, crime, amenity and air
//! quality statistics from public APIs, and turns them into scored metrics
//! with a composite livability score.

pub mod builders;
pub mod cache;
pub mod composite;
pub mod error;
pub mod provider;
pub mod scoring;
pub mod service;
pub mod sources;
pub mod types;

pub use error::{ContextError, Result};
pub use service::ContextReportService;
