//! NavMap CLI - Command-line interface
//!
//! This binary follows an NMEA sentence stream and keeps a map image from
//! the map image service current on disk.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};

mod commands;
mod error;
mod runner;

use commands::config::ConfigCommands;
use commands::run::RunArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "navmap")]
#[command(version = navmap::VERSION)]
#[command(about = "Moving-map client for NMEA navigation streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the sentence stream and keep the map image current
    Run {
        /// Host of the NMEA WebSocket bridge (saved to config)
        #[arg(long)]
        ip: Option<String>,

        /// Port of the NMEA WebSocket bridge (saved to config)
        #[arg(long)]
        port: Option<u16>,

        /// Connect on startup: 1 or 0 (saved to config)
        #[arg(long, value_parser = BoolishValueParser::new())]
        start: Option<bool>,

        /// Enable debug logging
        #[arg(long)]
        debug: bool,

        /// Where to write the current map image (default: ~/.navmap/map.png)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Latitude reported by the location sensor
        #[arg(long, allow_hyphen_values = true, requires = "sensor_lon")]
        sensor_lat: Option<f64>,

        /// Longitude reported by the location sensor
        #[arg(long, allow_hyphen_values = true, requires = "sensor_lat")]
        sensor_lon: Option<f64>,

        /// Heading reported by the location sensor, in degrees
        #[arg(long, requires = "sensor_lat")]
        sensor_heading: Option<f64>,
    },

    /// View and modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Run {
            ip,
            port,
            start,
            debug,
            output,
            sensor_lat,
            sensor_lon,
            sensor_heading,
        } => commands::run::run(RunArgs {
            ip,
            port,
            start,
            debug,
            output,
            sensor_lat,
            sensor_lon,
            sensor_heading,
        }),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "navmap",
            "run",
            "--ip",
            "10.0.0.5",
            "--port",
            "10110",
            "--start",
            "1",
            "--sensor-lat",
            "-33.9",
            "--sensor-lon",
            "18.4",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                ip,
                port,
                start,
                sensor_lat,
                sensor_lon,
                ..
            } => {
                assert_eq!(ip.as_deref(), Some("10.0.0.5"));
                assert_eq!(port, Some(10110));
                assert_eq!(start, Some(true));
                assert_eq!(sensor_lat, Some(-33.9));
                assert_eq!(sensor_lon, Some(18.4));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_sensor_flags_require_each_other() {
        assert!(Cli::try_parse_from(["navmap", "run", "--sensor-lat", "54.3"]).is_err());
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["navmap", "config", "set", "connection.port", "10110"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { .. }
            }
        ));
    }
}
