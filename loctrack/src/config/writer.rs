//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let tracking = &config.tracking;
    let api_key = config.geolocation.api_key.as_deref().unwrap_or("");
    let simulation_mode = if tracking.simulation_mode {
        "true"
    } else {
        "false"
    };

    format!(
        r#"[tracking]
; How often to sample the position, in milliseconds (default: 10000)
; Values below 1000 are raised to 1000
update_interval_ms = {}
; Use simulated waypoints instead of real position reads (default: false)
simulation_mode = {}
; Reads per tick including retries, 1-10 (default: 3)
max_retries = {}
; Exponential backoff between reads within one tick, in milliseconds
backoff_base_ms = {}
backoff_max_ms = {}
; Maximum wait for one position read, in milliseconds (default: 10000)
read_timeout_ms = {}
; Index of the first simulated waypoint (default: 0)
simulation_start = {}

[geolocation]
; Geolocation service endpoint. Leave empty to always use simulation.
endpoint = {}
; API key for the geolocation service, if required
api_key = {}

[logging]
; Log file location
file = {}
"#,
        tracking.update_interval_ms,
        simulation_mode,
        tracking.max_retries,
        tracking.backoff_base_ms,
        tracking.backoff_max_ms,
        tracking.read_timeout_ms,
        tracking.simulation_start,
        config.geolocation.endpoint,
        api_key,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.tracking.update_interval_ms = 15_000;
        config.tracking.simulation_mode = true;
        config.tracking.max_retries = 5;
        config.tracking.simulation_start = 2;
        config.geolocation.api_key = Some("test-api-key".to_string());
        config.logging.file = PathBuf::from("/tmp/loctrack-test.log");

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_defaults_survive_save() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, ConfigFile::default());
    }
}
