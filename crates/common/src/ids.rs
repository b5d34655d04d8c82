//! Type-safe identifier newtypes for certvault.
//!
//! These types keep credentials and instance identifiers from being mixed up
//! with plain strings (e.g., passing a domain where an API key is expected).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Server identifier used when no identifier is configured.
pub const DEFAULT_SERVER_ID: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

/// API key presented by a client.
///
/// The key is an opaque token. `Debug` never prints the value so keys do not
/// end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create from an existing string
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty key never grants access.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the value of an `Authorization` header.
    ///
    /// Accepts `Bearer <key>` (scheme is case-insensitive). Anything else
    /// yields an empty key, which every gate rejects.
    pub fn from_authorization(header: &str) -> Self {
        let header = header.trim();
        match header.split_once(' ') {
            Some((scheme, key)) if scheme.eq_ignore_ascii_case("bearer") => {
                Self(key.trim().to_string())
            }
            _ => Self(String::new()),
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<{} bytes>)", self.0.len())
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a running certvault instance.
///
/// Reported by the ping endpoint so clients can confirm which server they
/// reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerId(Uuid);

impl Default for ServerId {
    fn default() -> Self {
        // The constant is a valid hyphenated UUID
        Self(Uuid::from_u128(0x6ba7b810_9dad_11d1_80b4_00c04fd430c8))
    }
}

impl FromStr for ServerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_hides_value() {
        let key = ApiKey::new("super-secret");
        let printed = format!("{:?}", key);
        assert!(!printed.contains("super-secret"));
        assert_eq!(printed, "ApiKey(<12 bytes>)");
    }

    #[test]
    fn test_api_key_from_authorization() {
        assert_eq!(ApiKey::from_authorization("Bearer abc123").as_str(), "abc123");
        assert_eq!(ApiKey::from_authorization("bearer  abc123 ").as_str(), "abc123");
        assert!(ApiKey::from_authorization("Basic abc123").is_empty());
        assert!(ApiKey::from_authorization("Bearer").is_empty());
        assert!(ApiKey::from_authorization("").is_empty());
    }

    #[test]
    fn test_server_id_default_matches_constant() {
        assert_eq!(ServerId::default().to_string(), DEFAULT_SERVER_ID);
        assert_eq!(DEFAULT_SERVER_ID.parse::<ServerId>().unwrap(), ServerId::default());
        assert!("not-a-uuid".parse::<ServerId>().is_err());
    }
}
