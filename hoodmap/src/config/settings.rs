//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;
use std::time::Duration;

use crate::engine::BaseMap;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub data: DataSettings,
    pub map: MapSettings,
    pub logging: LoggingSettings,
}

/// Where datasets come from.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    /// Base URL (`http://` or `https://`) or a local directory.
    pub source: String,
    /// Timeout in seconds for HTTP requests.
    pub timeout: u64,
}

impl DataSettings {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Base map loaded at startup.
    pub base: BaseMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path; its parent directory is created on startup.
    pub file: PathBuf,
}
