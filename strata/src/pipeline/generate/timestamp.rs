//! Timestamp generator.

use std::fmt::Write as _;

use chrono::{SecondsFormat, Utc};

use crate::tree::TreeValue;

/// Format the current UTC time.
///
/// `unix` and `unixmilli` produce integers; `rfc3339` (the default) and
/// `iso8601` produce strings; anything else is a `strftime` pattern. A
/// pattern without any `%` specifier, such as a Go-style `2006-01-02`
/// layout, is rejected.
pub(super) fn generate(format: &str) -> Result<TreeValue, String> {
    let now = Utc::now();
    Ok(match format {
        "unix" => TreeValue::from(now.timestamp()),
        "unixmilli" => TreeValue::from(now.timestamp_millis()),
        "" | "rfc3339" => TreeValue::String(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        "iso8601" => TreeValue::String(now.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        pattern if !pattern.contains('%') => {
            return Err(format!(
                "timestamp pattern '{pattern}' has no strftime specifiers; use e.g. %Y-%m-%d"
            ));
        }
        pattern => {
            let mut out = String::new();
            write!(out, "{}", now.format(pattern))
                .map_err(|_| format!("invalid timestamp pattern '{pattern}'"))?;
            TreeValue::String(out)
        }
    })
}
