//! Default values for every setting and the `ConfigFile::default()` impl.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::engine::BaseMap;

/// Dataset location used when nothing is configured: the working directory.
pub const DEFAULT_DATA_SOURCE: &str = ".";

/// HTTP request timeout for dataset fetches.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_BASE_MAP: BaseMap = BaseMap::Dark;

/// `~/.hoodmap/logs/hoodmap.log`
pub fn default_log_file() -> PathBuf {
    config_directory().join("logs").join("hoodmap.log")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            data: DataSettings {
                source: DEFAULT_DATA_SOURCE.to_string(),
                timeout: DEFAULT_FETCH_TIMEOUT_SECS,
            },
            map: MapSettings {
                base: DEFAULT_BASE_MAP,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
