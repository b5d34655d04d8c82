//! Item kinds and the values returned for them.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a textual item kind is not one of [`ItemKind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported item kind: {0}")]
pub struct UnsupportedItemKind(pub String);

/// Logical type of certificate material a client can request.
///
/// The set is closed. Every consumer matches on it exhaustively so that a new
/// kind has to be wired through resolution, encoding and authorization at
/// the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    /// Renewal metadata
    Info,
    /// PEM private key
    Key,
    /// PEM leaf certificate (possibly followed by the chain)
    Cert,
    /// PEM full chain shared by the domain subtree
    CertChain,
    /// PKCS#12 archive with key and leaf certificate
    ArchiveSingle,
    /// PKCS#12 archive with key, leaf certificate and intermediates
    ArchiveChain,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Info,
        ItemKind::Key,
        ItemKind::Cert,
        ItemKind::CertChain,
        ItemKind::ArchiveSingle,
        ItemKind::ArchiveChain,
    ];

    /// Name used in request paths
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Info => "info",
            ItemKind::Key => "key",
            ItemKind::Cert => "cert",
            ItemKind::CertChain => "fullchain",
            ItemKind::ArchiveSingle => "pfx",
            ItemKind::ArchiveChain => "pfx-chain",
        }
    }

    /// Whether the item is assembled rather than served as stored
    pub fn is_archive(&self) -> bool {
        matches!(self, ItemKind::ArchiveSingle | ItemKind::ArchiveChain)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = UnsupportedItemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(ItemKind::Info),
            "key" => Ok(ItemKind::Key),
            "cert" | "certificate" => Ok(ItemKind::Cert),
            "fullchain" => Ok(ItemKind::CertChain),
            "pfx" | "p12" => Ok(ItemKind::ArchiveSingle),
            "pfx-chain" | "p12-chain" => Ok(ItemKind::ArchiveChain),
            other => Err(UnsupportedItemKind(other.to_string())),
        }
    }
}

/// Renewal information derived from a domain's metadata artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenewalInfo {
    /// When the current certificate was created
    pub start_date: DateTime<Utc>,
    /// When the next renewal is scheduled
    pub next_renew_time: DateTime<Utc>,
    /// Final path segment of the certificate link
    pub serial: String,
}

impl RenewalInfo {
    /// Render as `key = value` lines with Unix timestamps.
    pub fn to_text(&self) -> String {
        format!(
            "StartDate = {}\nNextRenewTime = {}\nSerial = {}\n",
            self.start_date.timestamp(),
            self.next_renew_time.timestamp(),
            self.serial
        )
    }
}

/// Last-modified time and size of the artifact backing an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStat {
    pub mod_time: DateTime<Utc>,
    pub size: u64,
}

/// The unit handed back to a caller for a fetched item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    /// Item payload
    pub data: Bytes,
    /// Modification time of the backing artifact
    pub mod_time: DateTime<Utc>,
    /// Size of the backing artifact
    pub size: u64,
}

impl ResultItem {
    pub fn stat(&self) -> ItemStat {
        ItemStat {
            mod_time: self.mod_time,
            size: self.size,
        }
    }
}
