//! User configuration stored in `~/.hoodmap/config.ini`.
//!
//! Settings structs live in [`settings`], constants in [`defaults`], parsing
//! in `parser` and serialization in `writer`. [`ConfigFile`] ties them
//! together with load and save helpers.

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    default_log_file, DEFAULT_BASE_MAP, DEFAULT_DATA_SOURCE, DEFAULT_FETCH_TIMEOUT_SECS,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DataSettings, LoggingSettings, MapSettings};
