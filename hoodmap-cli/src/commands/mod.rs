//! CLI command implementations.
//!
//! - [`config`] - Configuration file management (path, show, init)
//! - [`layers`] - Layer panel and engine state, with optional toggles
//! - [`stats`] - Amenity statistics and indexing diagnostics

pub mod config;
pub mod layers;
pub mod stats;
