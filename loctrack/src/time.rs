//! Time-related utility functions.
//!
//! Helpers for turning sample timestamps into ages and human-readable
//! freshness strings.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Time elapsed since `timestamp`.
///
/// Timestamps in the future (clock skew between the capture source and this
/// host) yield zero.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use loctrack::time::elapsed_since;
///
/// let captured = Utc::now() - chrono::Duration::seconds(90);
/// assert!(elapsed_since(captured).as_secs() >= 90);
/// ```
pub fn elapsed_since(timestamp: DateTime<Utc>) -> Duration {
    (Utc::now() - timestamp).to_std().unwrap_or(Duration::ZERO)
}

/// Format an age as a short freshness string ("just now", "42s ago",
/// "3m ago", "2h ago", "5d ago").
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=4 => "just now".to_string(),
        5..=59 => format!("{}s ago", secs),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
