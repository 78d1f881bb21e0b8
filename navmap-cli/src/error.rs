//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use navmap::config::{ConfigFileError, ConfigKeyError};
use navmap::fetch::FetchError;
use navmap::transport::TransportError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to read or write the config file
    ConfigFile(ConfigFileError),
    /// Failed to create the image client
    ClientCreation(FetchError),
    /// Sentence stream could not be set up
    Transport(TransportError),
    /// Invalid command-line arguments
    InvalidArgument(String),
    /// The session task failed
    Session(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Transport(TransportError::InvalidEndpoint { .. }) => {
                eprintln!();
                eprintln!("Check the stream endpoint:");
                eprintln!("  navmap config get connection.ip");
                eprintln!("  navmap config get connection.port");
                eprintln!("or override it with --ip and --port.");
            }
            CliError::ConfigFile(_) => {
                eprintln!();
                eprintln!(
                    "Fix or remove {} to continue.",
                    navmap::config::config_file_path().display()
                );
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
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::ClientCreation(e) => write!(f, "Failed to create image client: {}", e),
            CliError::Transport(e) => write!(f, "Sentence stream error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Session(msg) => write!(f, "Session failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::ClientCreation(e) => Some(e),
            CliError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ConfigKeyError> for CliError {
    fn from(e: ConfigKeyError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::ClientCreation(e)
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Transport(e)
    }
}
