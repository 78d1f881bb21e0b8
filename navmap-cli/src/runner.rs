//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and client creation
//! so command handlers stay small.

use std::time::Duration;

use navmap::config::ConfigFile;
use navmap::fetch::{MapFetcher, ReqwestImageClient};
use navmap::logging::{init_logging, LoggingGuard, LoggingOptions};
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let options = LoggingOptions {
            stdout: true,
            debug: debug_mode,
        };
        let logging_guard = init_logging(&config.logging.file, options)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("NavMap v{}", navmap::VERSION);
        info!("NavMap CLI: {} command", command);
        info!(
            config = %navmap::config::config_file_path().display(),
            log = %self.config.logging.file.display(),
            "Configuration loaded"
        );
    }

    /// Create the image fetcher for the configured service.
    pub fn create_fetcher(&self) -> Result<MapFetcher<ReqwestImageClient>, CliError> {
        let timeout = Duration::from_secs(self.config.service.request_timeout_secs);
        let client = ReqwestImageClient::with_timeout(timeout)?;
        info!(
            base_url = %self.config.service.base_url,
            timeout_secs = timeout.as_secs(),
            "Image client created"
        );
        Ok(MapFetcher::new(client, self.config.service.base_url.clone()))
    }
}
