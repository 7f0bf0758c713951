//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and session
//! startup so command handlers only deal with their own output.

use tokio::runtime::Runtime;
use tracing::info;

use hoodmap::config::ConfigFile;
use hoodmap::engine::{BaseMap, MapEvent, MemoryEngine};
use hoodmap::logging::{init_logging, split_log_path, LoggingGuard};
use hoodmap::session;
use hoodmap::source::ConfiguredSource;
use hoodmap::visibility::OverlayController;

use crate::error::CliError;

/// Command-line values that take precedence over config.ini.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<String>,
    pub base_map: Option<BaseMap>,
    pub debug: bool,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Load config, apply overrides and initialize logging.
    ///
    /// Logs go to the configured file only; stdout is left to command output.
    pub fn new(overrides: Overrides) -> Result<Self, CliError> {
        let mut config = ConfigFile::load()?;
        if let Some(source) = overrides.source {
            config.data.source = source;
        }
        if let Some(base) = overrides.base_map {
            config.map.base = base;
        }

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let logging_guard = init_logging(log_dir, log_file, false, overrides.debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = Runtime::new().map_err(CliError::Runtime)?;

        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(version = hoodmap::VERSION, command, "hoodmap CLI starting");
    }

    /// Load the datasets and bring a memory engine to a settled state:
    /// overlays installed and ordered.
    pub fn start_session(&self) -> Result<OverlayController<MemoryEngine>, CliError> {
        let data = &self.config.data;
        let source = ConfiguredSource::from_location(&data.source, data.timeout_duration())
            .map_err(CliError::Source)?;
        info!(source = %data.source, base_map = %self.config.map.base, "Loading datasets");

        let engine = MemoryEngine::with_base_map(self.config.map.base);
        let mut controller = self.runtime.block_on(session::start(&source, engine))?;
        controller.handle_event(MapEvent::Idle);
        Ok(controller)
    }
}
