//! Utility functions and helpers
//!
//! Text encodings for certificate bytes and human-readable formatting used by
//! the command line output.

use crate::{Error, Result};
use std::fmt::Write;
use std::time::Duration;

/// Dump bytes as `\xAB` escapes
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for byte in bytes {
        // Writing to a String never fails
        let _ = write!(out, "\\x{:02X}", byte);
    }
    out
}

/// Parse `\xAB` escapes back into bytes; whitespace between escapes is ignored
pub fn unescape_bytes(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = Vec::with_capacity(compact.len() / 4);
    let mut rest = compact.as_str();

    while !rest.is_empty() {
        let body = rest
            .strip_prefix("\\x")
            .or_else(|| rest.strip_prefix("\\X"))
            .ok_or_else(|| Error::encoding(format!("expected \\x escape at '{}'", truncate(rest))))?;
        let digits = body
            .get(..2)
            .ok_or_else(|| Error::encoding("truncated \\x escape"))?;
        let byte = u8::from_str_radix(digits, 16)
            .map_err(|e| Error::encoding(format!("invalid escape '\\x{}': {}", digits, e)))?;
        out.push(byte);
        rest = &body[2..];
    }

    Ok(out)
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(8) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Compute hash rate over a time period
pub fn compute_hash_rate(hashes: u64, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        hashes as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}

/// Format hash rate as a human-readable string
pub fn format_hash_rate(hashes_per_sec: f64) -> String {
    const UNITS: &[&str] = &["H/s", "KH/s", "MH/s", "GH/s", "TH/s", "PH/s"];
    let mut rate = hashes_per_sec;
    let mut unit_index = 0;

    while rate >= 1000.0 && unit_index < UNITS.len() - 1 {
        rate /= 1000.0;
        unit_index += 1;
    }

    format!("{:.2} {}", rate, UNITS[unit_index])
}

/// Format a duration with millisecond precision, e.g. `1m 3s 250ms`
pub fn format_duration(duration: Duration) -> String {
    let millis = Duration::from_millis(duration.as_millis().min(u128::from(u64::MAX)) as u64);
    humantime::format_duration(millis).to_string()
}
