//! Renewal metadata parsing
//!
//! The metadata artifact is the `key=value` domain configuration written by
//! the renewal client. Only three keys matter here:
//!
//! ```text
//! Le_CertCreateTime='1700000000'
//! Le_NextRenewTime='1707000000'
//! Le_LinkCert='https://acme.example/cert/cert123.pem'
//! ```
//!
//! The serial reported to clients is the final segment of `Le_LinkCert`.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use certvault_common::RenewalInfo;

/// Certificate creation time, seconds since the epoch
pub const CREATE_TIME_KEY: &str = "Le_CertCreateTime";
/// Next scheduled renewal, seconds since the epoch
pub const NEXT_RENEW_KEY: &str = "Le_NextRenewTime";
/// Location of the issued certificate; its last segment is the serial
pub const LINK_CERT_KEY: &str = "Le_LinkCert";

/// Reasons a metadata artifact is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("metadata is not valid UTF-8")]
    NotUtf8,

    #[error("missing key {0}")]
    MissingKey(&'static str),

    #[error("key {key} is not a timestamp: {value:?}")]
    InvalidTimestamp { key: &'static str, value: String },

    #[error("key {0} is empty")]
    EmptyValue(&'static str),

    #[error("key {key} has no final path segment: {value:?}")]
    EmptySerial { key: &'static str, value: String },
}

/// Parse a metadata artifact into renewal information
pub fn parse(bytes: &[u8]) -> Result<RenewalInfo, MetadataError> {
    let text = std::str::from_utf8(bytes).map_err(|_| MetadataError::NotUtf8)?;
    let entries = parse_entries(text);

    let start_date = timestamp(&entries, CREATE_TIME_KEY)?;
    let next_renew_time = timestamp(&entries, NEXT_RENEW_KEY)?;
    let serial = serial(&entries, LINK_CERT_KEY)?;

    Ok(RenewalInfo {
        start_date,
        next_renew_time,
        serial,
    })
}

/// Collect `key=value` pairs; later duplicates win
fn parse_entries(text: &str) -> HashMap<&str, &str> {
    let mut entries = HashMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with(';')
            || (line.starts_with('[') && line.ends_with(']'))
        {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            entries.insert(key.trim(), unquote(value.trim()));
        }
    }

    entries
}

fn unquote(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn required<'a>(entries: &HashMap<&str, &'a str>, key: &'static str) -> Result<&'a str, MetadataError> {
    match entries.get(key) {
        None => Err(MetadataError::MissingKey(key)),
        Some(value) if value.is_empty() => Err(MetadataError::EmptyValue(key)),
        Some(value) => Ok(value),
    }
}

fn timestamp(entries: &HashMap<&str, &str>, key: &'static str) -> Result<DateTime<Utc>, MetadataError> {
    let value = required(entries, key)?;
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| MetadataError::InvalidTimestamp {
            key,
            value: value.to_string(),
        })
}

fn serial(entries: &HashMap<&str, &str>, key: &'static str) -> Result<String, MetadataError> {
    let value = required(entries, key)?;
    let segment = value.rsplit('/').next().unwrap_or(value);
    if segment.is_empty() {
        return Err(MetadataError::EmptySerial {
            key,
            value: value.to_string(),
        });
    }
    Ok(segment.to_string())
}
