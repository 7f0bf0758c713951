//! Dataset sources.
//!
//! ```text
//! DatasetSource (trait)
//!   ├── HttpDatasetSource   GET <base>/<file>, Cache-Control: no-store
//!   ├── DirectorySource     tokio::fs::read(<dir>/<file>)
//!   └── ConfiguredSource    one of the above, chosen from a location string
//! ```
//!
//! [`preload`] joins the four core fetches; the isochrone dataset is fetched
//! separately by [`crate::isochrone::load_isochrones`] and may fail on its own.

mod directory;
mod http;
mod preload;
mod types;

use std::time::Duration;

pub use directory::DirectorySource;
pub use http::HttpDatasetSource;
pub use preload::{preload, Datasets, PreloadError, PRELOAD_FAILURE_MESSAGE};
pub use types::{Dataset, DatasetSource, FetchError};

use crate::geojson::FeatureCollection;

/// A source selected from a configured location.
///
/// `http://` and `https://` locations fetch over HTTP; anything else is a
/// directory path.
#[derive(Clone)]
pub enum ConfiguredSource {
    Http(HttpDatasetSource),
    Directory(DirectorySource),
}

impl ConfiguredSource {
    pub fn from_location(location: &str, timeout: Duration) -> Result<Self, FetchError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(ConfiguredSource::Http(HttpDatasetSource::new(location, timeout)?))
        } else {
            Ok(ConfiguredSource::Directory(DirectorySource::new(location)))
        }
    }
}

impl DatasetSource for ConfiguredSource {
    async fn fetch(&self, dataset: Dataset) -> Result<FeatureCollection, FetchError> {
        match self {
            ConfiguredSource::Http(source) => source.fetch(dataset).await,
            ConfiguredSource::Directory(source) => source.fetch(dataset).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_selects_source_kind() {
        let timeout = Duration::from_secs(1);
        assert!(matches!(
            ConfiguredSource::from_location("https://example.org/data", timeout).unwrap(),
            ConfiguredSource::Http(_)
        ));
        match ConfiguredSource::from_location("./data", timeout).unwrap() {
            ConfiguredSource::Directory(dir) => assert!(dir.root().ends_with("data")),
            ConfiguredSource::Http(_) => panic!("expected a directory source"),
        }
    }
}
