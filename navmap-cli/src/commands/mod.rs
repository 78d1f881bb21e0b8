//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`console`] - Operator commands read while a session runs
//! - [`run`] - Main command (follow the stream, keep the map current)

pub mod config;
pub mod console;
pub mod run;
