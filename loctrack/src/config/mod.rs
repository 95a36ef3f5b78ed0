//! Configuration file support for loctrack.
//!
//! User configuration lives in `~/.loctrack/config.ini`:
//!
//! ```ini
//! [tracking]
//! update_interval_ms = 10000
//! simulation_mode = false
//! max_retries = 3
//!
//! [geolocation]
//! endpoint = https://www.googleapis.com/geolocation/v1/geolocate
//! api_key =
//!
//! [logging]
//! file = ~/.loctrack/logs/loctrack.log
//! ```
//!
//! Settings structs live in `settings`, constants in `defaults`, parsing in
//! `parser`, and serialization in `writer`.
//!
//! # Example
//!
//! ```no_run
//! use loctrack::config::ConfigFile;
//!
//! let config = ConfigFile::load().unwrap_or_default();
//! let engine_config = config
//!     .to_engine_config()
//!     .on_update(|sample| println!("{}, {}", sample.latitude, sample.longitude))
//!     .on_error(|error| eprintln!("{}", error));
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, GeolocationSettings, LoggingSettings, TrackingSettings};
