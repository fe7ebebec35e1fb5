//! # LCX Common Library
//!
//! Shared code for the location context workspace including:
//! - Error type and result alias
//! - Configuration loading (ENV → TOML → compiled defaults)
//! - Tracing initialisation
//! - Geographic helpers (distances, WKT points, region codes)

pub mod config;
pub mod error;
pub mod geo;
pub mod logging;

pub use error::{Error, Result};
