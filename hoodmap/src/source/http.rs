//! Dataset source backed by an HTTP server.

use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use tracing::{debug, warn};

use super::types::{parse_collection, Dataset, DatasetSource, FetchError};
use crate::geojson::FeatureCollection;

const USER_AGENT: &str = concat!("hoodmap/", env!("CARGO_PKG_VERSION"));

/// Fetches `<base>/<dataset file>` over HTTP with caching disabled.
#[derive(Clone)]
pub struct HttpDatasetSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDatasetSource {
    /// Create a source rooted at `base_url` with a request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// URL of a dataset under the base.
    pub fn url_for(&self, dataset: Dataset) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            dataset.file_name()
        )
    }
}

impl DatasetSource for HttpDatasetSource {
    async fn fetch(&self, dataset: Dataset) -> Result<FeatureCollection, FetchError> {
        let url = self.url_for(dataset);
        debug!(url = %url, "Fetching dataset");

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Dataset request failed");
                FetchError::Request {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Dataset request returned an error status");
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Request {
            url: url.clone(),
            reason: format!("Failed to read response: {}", e),
        })?;

        parse_collection(dataset, &body)
    }
}
