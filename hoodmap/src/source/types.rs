//! Dataset names, the source trait and its error type.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

use crate::geojson::FeatureCollection;

/// The GeoJSON datasets the overlay is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Streets,
    Schools,
    NeighborhoodLimits,
    Buildings,
    SchoolIsochrones,
}

impl Dataset {
    /// Datasets the preload cannot do without.
    pub const CORE: [Dataset; 4] = [
        Dataset::Streets,
        Dataset::Schools,
        Dataset::NeighborhoodLimits,
        Dataset::Buildings,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Streets => "streets.geojson",
            Dataset::Schools => "schools.geojson",
            Dataset::NeighborhoodLimits => "neighborhood_limits.geojson",
            Dataset::Buildings => "buildings.geojson",
            Dataset::SchoolIsochrones => "school_isochrones.geojson",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Transport failure while fetching a dataset.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Request for {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{dataset} is not a valid feature collection: {source}")]
    Parse {
        dataset: Dataset,
        #[source]
        source: serde_json::Error,
    },
}

/// Something that can produce the named datasets.
///
/// Implementations are expected to bypass any caching layer: every fetch
/// returns the current contents.
pub trait DatasetSource: Send + Sync {
    fn fetch(
        &self,
        dataset: Dataset,
    ) -> impl Future<Output = Result<FeatureCollection, FetchError>> + Send;
}

/// Decode a dataset body.
pub(crate) fn parse_collection(
    dataset: Dataset,
    body: &[u8],
) -> Result<FeatureCollection, FetchError> {
    serde_json::from_slice(body).map_err(|source| FetchError::Parse { dataset, source })
}
