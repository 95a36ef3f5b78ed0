//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::clamp_max_retries;
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [tracking] section
    if let Some(section) = ini.section(Some("tracking")) {
        let tracking = &mut config.tracking;

        if let Some(v) = section.get("update_interval_ms") {
            tracking.update_interval_ms = parse_positive("tracking", "update_interval_ms", v)?;
        }
        if let Some(v) = section.get("simulation_mode") {
            tracking.simulation_mode = parse_bool(v);
        }
        if let Some(v) = section.get("max_retries") {
            let requested: u32 = parse_number("tracking", "max_retries", v, "must be an integer")?;
            tracking.max_retries = clamp_max_retries(requested);
        }
        if let Some(v) = section.get("backoff_base_ms") {
            tracking.backoff_base_ms = parse_positive("tracking", "backoff_base_ms", v)?;
        }
        if let Some(v) = section.get("backoff_max_ms") {
            tracking.backoff_max_ms = parse_positive("tracking", "backoff_max_ms", v)?;
        }
        if let Some(v) = section.get("read_timeout_ms") {
            tracking.read_timeout_ms = parse_positive("tracking", "read_timeout_ms", v)?;
        }
        if let Some(v) = section.get("simulation_start") {
            tracking.simulation_start = parse_number(
                "tracking",
                "simulation_start",
                v,
                "must be a non-negative integer",
            )?;
        }

        if tracking.backoff_max_ms < tracking.backoff_base_ms {
            return Err(invalid(
                "tracking",
                "backoff_max_ms",
                &tracking.backoff_max_ms.to_string(),
                "must not be below backoff_base_ms",
            ));
        }
    }

    // [geolocation] section
    if let Some(section) = ini.section(Some("geolocation")) {
        if let Some(v) = section.get("endpoint") {
            let v = v.trim();
            if !v.is_empty() && !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid(
                    "geolocation",
                    "endpoint",
                    v,
                    "must be an http:// or https:// URL, or empty to disable",
                ));
            }
            config.geolocation.endpoint = v.to_string();
        }
        config.geolocation.api_key = optional_string(section, "api_key");
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

/// Parse a millisecond value that must be greater than zero.
fn parse_positive(section: &str, key: &str, value: &str) -> Result<u64, ConfigFileError> {
    let reason = "must be a positive integer (milliseconds)";
    match parse_number::<u64>(section, key, value, reason)? {
        0 => Err(invalid(section, key, value, reason)),
        n => Ok(n),
    }
}

fn optional_string(section: &Properties, key: &str) -> Option<String> {
    section
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a boolean value from a string.
///
/// Accepts "true", "1", "yes", "on" (case-insensitive) as true.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::tracking::MAX_RETRIES_LIMIT;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[tracking]
update_interval_ms = 30000
simulation_mode = yes

[geolocation]
api_key = my-key
"#,
        )
        .unwrap();

        // Specified values
        assert_eq!(config.tracking.update_interval_ms, 30_000);
        assert!(config.tracking.simulation_mode);
        assert_eq!(config.geolocation.api_key, Some("my-key".to_string()));

        // Default values
        assert_eq!(config.tracking.max_retries, DEFAULT_MAX_RETRIES_SETTING);
        assert_eq!(config.geolocation.endpoint, DEFAULT_GEOLOCATION_ENDPOINT);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = load("[tracking]\nupdate_interval_ms = 0\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "tracking");
                assert_eq!(key, "update_interval_ms");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = load("[tracking]\nread_timeout_ms = soon\n").unwrap_err();
        assert!(err.to_string().contains("tracking.read_timeout_ms"));
    }

    #[test]
    fn test_max_retries_clamped() {
        let config = load("[tracking]\nmax_retries = 0\n").unwrap();
        assert_eq!(config.tracking.max_retries, 1);

        let config = load("[tracking]\nmax_retries = 99\n").unwrap();
        assert_eq!(config.tracking.max_retries, MAX_RETRIES_LIMIT);
    }

    #[test]
    fn test_backoff_ordering_rejected() {
        let err = load("[tracking]\nbackoff_base_ms = 2000\nbackoff_max_ms = 1000\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "backoff_max_ms"
        ));
    }

    #[test]
    fn test_endpoint_validation() {
        let err = load("[geolocation]\nendpoint = ftp://example.com\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));

        // Empty disables device reads
        let config = load("[geolocation]\nendpoint =\n").unwrap();
        assert!(config.geolocation.endpoint.is_empty());
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let config = load("[geolocation]\napi_key =   \n").unwrap();
        assert!(config.geolocation.api_key.is_none());
    }

    #[test]
    fn test_parse_bool_values() {
        assert!(parse_bool("true"));
        assert!(parse_bool("YES"));
        assert!(parse_bool("1"));
        assert!(parse_bool("  on "));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("off"));
        assert!(!parse_bool("maybe"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/var/log/x.log"), PathBuf::from("/var/log/x.log"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x.log"), home.join("x.log"));
        }
    }
}
