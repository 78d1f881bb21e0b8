//! Persistent configuration for ~/.navmap/config.ini.
//!
//! - [`ConfigFile`]: typed settings, one struct per INI section
//! - [`ConfigKey`]: `section.key` access used by `navmap config get|set`
//!
//! # Example
//!
//! ```
//! use navmap::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::default();
//! ConfigKey::ConnectionPort.set(&mut config, "10110").unwrap();
//! assert_eq!(config.connection.port, 10110);
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::*;
