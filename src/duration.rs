//! Timeout parsing for config values like "5s", "500ms", "2m".

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer, Serializer};

/// Parse a timeout string.
///
/// Supported units:
/// - `ms` - milliseconds
/// - `s` - seconds
/// - `m` - minutes
///
/// The input is case-insensitive and whitespace is trimmed.
///
/// # Examples
///
/// ```
/// use pricetag::duration::parse_timeout;
/// use std::time::Duration;
///
/// assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
/// assert_eq!(parse_timeout("250ms").unwrap(), Duration::from_millis(250));
/// assert_eq!(parse_timeout("2m").unwrap(), Duration::from_secs(120));
/// ```
pub fn parse_timeout(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    // `ms` has to be checked before `s` and `m`.
    let (num, millis_per_unit) = if let Some(num) = s.strip_suffix("ms") {
        (num, 1)
    } else if let Some(num) = s.strip_suffix('s') {
        (num, 1_000)
    } else if let Some(num) = s.strip_suffix('m') {
        (num, 60_000)
    } else {
        anyhow::bail!("Timeout must end with ms, s, or m");
    };

    let num: u64 = num
        .trim()
        .parse()
        .with_context(|| format!("Invalid number in timeout {s:?}"))?;
    let millis = num
        .checked_mul(millis_per_unit)
        .context("Timeout is too large")?;

    Ok(Duration::from_millis(millis))
}

/// Format a timeout using the largest unit that divides it evenly.
pub fn format_timeout(d: Duration) -> String {
    let millis = d.as_millis();
    if millis >= 60_000 && millis % 60_000 == 0 {
        format!("{}m", millis / 60_000)
    } else if millis >= 1_000 && millis % 1_000 == 0 {
        format!("{}s", millis / 1_000)
    } else {
        format!("{millis}ms")
    }
}

/// Serde deserializer for timeout strings.
///
/// Use with `#[serde(deserialize_with = "deserialize_timeout")]`.
pub fn deserialize_timeout<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timeout(&s).map_err(de::Error::custom)
}

pub fn serialize_timeout<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timeout(*d))
}
