//! CLI error handling with user-friendly messages.
//!
//! Centralizes error formatting and exit codes for every command.

use std::fmt;
use std::process;

use hoodmap::config::ConfigFileError;
use hoodmap::source::{FetchError, PreloadError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Dataset source could not be created
    Source(FetchError),
    /// Core datasets could not be loaded
    Preload(PreloadError),
    /// A `--toggle` argument was malformed
    Toggle { arg: String, reason: String },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Preload(e) => {
                eprintln!();
                eprintln!("{}", e.panel_message());
                eprintln!("Check that the data source contains:");
                for dataset in hoodmap::source::Dataset::CORE {
                    eprintln!("  - {}", dataset.file_name());
                }
            }
            CliError::Toggle { .. } => {
                eprintln!();
                eprintln!("Use 'hoodmap layers' to list the available keys.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            CliError::Source(e) => write!(f, "Invalid data source: {}", e),
            CliError::Preload(e) => write!(f, "{}", e),
            CliError::Toggle { arg, reason } => {
                write!(f, "Invalid toggle '{}': {}", arg, reason)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::Source(e) => Some(e),
            CliError::Preload(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<PreloadError> for CliError {
    fn from(e: PreloadError) -> Self {
        CliError::Preload(e)
    }
}
