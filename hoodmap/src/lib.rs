//! Hoodmap - neighborhood overlays for a web map
//!
//! Loads street, school, boundary and building datasets, groups them per
//! neighborhood and keeps a hierarchical set of map layers in sync with a
//! tree of visibility flags. Layers are installed lazily, reinstalled after
//! every base-style change, and kept in a fixed paint order underneath the
//! base map's labels.
//!
//! # Overview
//!
//! ```ignore
//! use hoodmap::engine::MemoryEngine;
//! use hoodmap::source::DirectorySource;
//!
//! let source = DirectorySource::new("data");
//! let mut controller = hoodmap::session::start(&source, MemoryEngine::new()).await?;
//!
//! let key = "nb__dtn__bike";
//! controller.set_visible_key(key, false)?;
//! println!("{}", controller.panel().rows.len());
//! ```

pub mod config;
pub mod engine;
pub mod geojson;
pub mod index;
pub mod inspect;
pub mod isochrone;
pub mod keys;
pub mod logging;
pub mod markers;
pub mod order;
pub mod panel;
pub mod scheduler;
pub mod session;
pub mod source;
pub mod visibility;

/// Version of the hoodmap library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
