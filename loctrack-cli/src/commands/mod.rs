//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (path, show, init)
//! - [`run`] - Start tracking and print samples until interrupted

pub mod config;
pub mod run;
