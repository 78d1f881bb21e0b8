//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list` and `config path`
//! for viewing and modifying configuration settings from the command line.

use clap::Subcommand;
use navmap::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., connection.ip)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., connection.ip)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'navmap config list' to see available keys.",
            key
        ))
    })
}

/// Get a configuration value.
fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load().unwrap_or_default();
    println!("{}", display_value(&config_key.get(&config)));
    Ok(())
}

/// Set a configuration value.
fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load().unwrap_or_default();
    config_key.set(&mut config, value)?;
    config.save()?;

    println!("Set {} = {}", config_key.name(), config_key.get(&config));

    Ok(())
}

/// List all configuration settings.
fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();

    println!("Configuration Settings");
    println!("======================");
    println!();
    print!("{}", render_listing(&config));

    Ok(())
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Every key grouped under its `[section]` header.
fn render_listing(config: &ConfigFile) -> String {
    let mut out = String::new();
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            if !current_section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            current_section = section;
        }

        out.push_str(&format!(
            "  {} = {}\n",
            key.key_name(),
            display_value(&key.get(config))
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse_key("connection.host").unwrap_err();
        assert!(err.to_string().contains("navmap config list"));
    }

    #[test]
    fn test_listing_groups_by_section() {
        let listing = render_listing(&ConfigFile::default());

        assert!(listing.starts_with("[connection]\n"));
        assert!(listing.contains("  ip = 127.0.0.1\n"));
        assert!(listing.contains("  port = 8080\n"));
        assert!(listing.contains("\n[map]\n"));
        assert!(listing.contains("\n[logging]\n"));
        assert_eq!(listing.matches("[connection]").count(), 1);
    }

    #[test]
    fn test_empty_value_display() {
        assert_eq!(display_value(""), "(not set)");
        assert_eq!(display_value("8080"), "8080");
    }
}
