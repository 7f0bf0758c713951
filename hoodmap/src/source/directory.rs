//! Dataset source backed by a local directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{parse_collection, Dataset, DatasetSource, FetchError};
use crate::geojson::FeatureCollection;

/// Reads `<dir>/<dataset file>` from disk on every fetch.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.file_name())
    }
}

impl DatasetSource for DirectorySource {
    async fn fetch(&self, dataset: Dataset) -> Result<FeatureCollection, FetchError> {
        let path = self.path_for(dataset);
        debug!(path = %path.display(), "Reading dataset");
        let body = tokio::fs::read(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })?;
        parse_collection(dataset, &body)
    }
}
