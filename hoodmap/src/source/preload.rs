//! Join-all preload of the four core datasets.

use thiserror::Error;
use tracing::{error, info};

use super::types::{Dataset, DatasetSource, FetchError};
use crate::geojson::FeatureCollection;
use crate::index::SpatialIndex;

/// Message shown in the layer panel when the core datasets cannot be loaded.
pub const PRELOAD_FAILURE_MESSAGE: &str = "Nu s-au putut încărca fișierele .geojson";

/// Preload failed; nothing is installed.
#[derive(Debug, Error)]
#[error("Failed to preload datasets: {0}")]
pub struct PreloadError(#[from] pub FetchError);

impl PreloadError {
    /// Localized message for the panel.
    pub fn panel_message(&self) -> &'static str {
        PRELOAD_FAILURE_MESSAGE
    }
}

/// The four core collections.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub streets: FeatureCollection,
    pub schools: FeatureCollection,
    pub boundaries: FeatureCollection,
    pub buildings: FeatureCollection,
}

impl Datasets {
    /// Build the spatial index over these collections.
    pub fn index(&self) -> SpatialIndex {
        SpatialIndex::build(
            Some(&self.streets),
            Some(&self.schools),
            Some(&self.boundaries),
            Some(&self.buildings),
        )
    }
}

/// Fetch the core datasets concurrently; the first failure aborts the rest.
pub async fn preload<S: DatasetSource>(source: &S) -> Result<Datasets, PreloadError> {
    let result = tokio::try_join!(
        source.fetch(Dataset::Streets),
        source.fetch(Dataset::Schools),
        source.fetch(Dataset::NeighborhoodLimits),
        source.fetch(Dataset::Buildings),
    );

    match result {
        Ok((streets, schools, boundaries, buildings)) => {
            info!(
                streets = streets.len(),
                schools = schools.len(),
                boundaries = boundaries.len(),
                buildings = buildings.len(),
                "Datasets preloaded"
            );
            Ok(Datasets {
                streets,
                schools,
                boundaries,
                buildings,
            })
        }
        Err(e) => {
            error!(error = %e, "Dataset preload failed");
            Err(e.into())
        }
    }
}
