//! Isochrone loader.
//!
//! Precomputed walking and cycling reachability polygons, one dataset for the
//! whole city, bucketed per school and mode and banded by travel cost.

mod band;
mod loader;

pub use band::Band;
pub use loader::{bucket_isochrones, load_isochrones, Availability, IsochroneBucket, IsochroneIndex};
