//! Shared infrastructure for lcx-engine integration tests
//!
//! - fixtures: representative snapshots for a central Amsterdam address
//! - mock_sources: in-memory sources and resolver with call counters and
//!   injectable failure modes

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_sources;

pub use mock_sources::{Behavior, CoordinateResolver, Harness, MockResolver, MockSource};
