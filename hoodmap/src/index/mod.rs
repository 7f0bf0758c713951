//! Spatial indexer.
//!
//! Consumes the four core collections once (neighborhood boundaries, streets,
//! schools, buildings) and produces the single source of truth every other
//! component reads:
//!
//! ```text
//! boundaries ──► neighborhoods (sorted by name) + boundary lookup
//! streets    ──► per-neighborhood street bucket + sorted school list
//! buildings  ──► per-neighborhood building count
//! schools    ──► school lookup by slug (name, coordinate, numeric label)
//! ```
//!
//! Features that reference an unknown neighborhood are dropped; features
//! missing their identifying properties are skipped with a warning. Nothing
//! here fails: absent or malformed input leaves the corresponding stage empty.

mod collate;
pub mod props;
mod spatial;
mod stats;

pub use collate::compare_names;
pub use spatial::{IndexDiagnostics, Neighborhood, NeighborhoodBucket, School, SpatialIndex};
pub use stats::{AmenityReport, AmenityStats, NeighborhoodStats};
