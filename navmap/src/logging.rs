//! Logging infrastructure for NavMap.
//!
//! Provides structured logging with file output and optional console output:
//! - Writes to the configured log file (cleared on session start)
//! - Optionally prints to stdout for CLI tailing
//! - Multi-line pretty format in the file for readability
//! - Configurable via RUST_LOG environment variable

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Where log output goes besides the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOptions {
    /// Mirror log output to stdout
    pub stdout: bool,
    /// Default to DEBUG instead of INFO when RUST_LOG is not set
    pub debug: bool,
}

impl LoggingOptions {
    /// Filter directive used when RUST_LOG is not set.
    pub fn default_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file,
/// and sets up output to the file and, if requested, stdout.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(log_file: &Path, options: LoggingOptions) -> Result<LoggingGuard, io::Error> {
    let (log_dir, file_name) = prepare_log_file(log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false) // No ANSI colors in file
        .with_span_events(FmtSpan::CLOSE)
        .pretty();

    let stdout_layer = options.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Create the log directory and truncate the log file.
///
/// Returns the directory and file name for the appender.
fn prepare_log_file(log_file: &Path) -> Result<(PathBuf, OsString), io::Error> {
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("log path '{}' has no file name", log_file.display()),
            )
        })?;
    let log_dir = match log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&log_dir)?;
    // Clear previous log file; handles both existing and missing files
    fs::write(log_file, "")?;

    Ok((log_dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(LoggingOptions::default().default_directive(), "info");
        let options = LoggingOptions {
            debug: true,
            ..Default::default()
        };
        assert_eq!(options.default_directive(), "debug");
    }

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_file = temp_dir.path().join("deep").join("nested").join("navmap.log");

        let (dir, name) = prepare_log_file(&log_file).unwrap();

        assert_eq!(dir, temp_dir.path().join("deep").join("nested"));
        assert_eq!(name, "navmap.log");
        assert!(log_file.exists());
    }

    #[test]
    fn test_prepare_clears_existing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_file = temp_dir.path().join("navmap.log");
        fs::write(&log_file, "old log data").unwrap();

        prepare_log_file(&log_file).unwrap();

        assert_eq!(fs::read_to_string(&log_file).unwrap(), "");
    }

    #[test]
    fn test_prepare_rejects_path_without_file_name() {
        let err = prepare_log_file(Path::new("/")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard { _file_guard: guard };
    }

    // Actual log output needs a global subscriber, which can only be set
    // once per process; the file preparation above is what can be checked here.
}
