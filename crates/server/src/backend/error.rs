//! Error types for the distribution backend.

use thiserror::Error;

use certvault_common::UnsupportedItemKind;

use super::archive::ArchiveError;
use super::metadata::MetadataError;

/// Errors raised by an artifact store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Domain would alter the path structure of the store
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),

    /// Artifact name would alter the path structure of the store
    #[error("invalid artifact name: {0:?}")]
    InvalidName(String),

    #[error("artifact not found: {0}")]
    NotFound(String),

    /// Artifact resolves (through a link) outside its domain directory
    #[error("artifact {0} resolves outside its domain directory")]
    OutsideScope(String),

    #[error("I/O error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(name: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(name.to_string())
        } else {
            StoreError::Io {
                name: name.to_string(),
                source,
            }
        }
    }
}

/// Outcome of a failed backend request
///
/// Every internal failure reaches the caller as one of these variants; the
/// backend never retries and never returns partial data.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Credential does not grant the requested domain
    #[error("unauthorized")]
    Unauthorized,

    /// Domain rejected before touching the store
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),

    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    UnsupportedItemKind(#[from] UnsupportedItemKind),

    #[error("malformed metadata in {artifact}: {source}")]
    MalformedMetadata {
        artifact: String,
        #[source]
        source: MetadataError,
    },

    #[error("failed to decode private key {artifact} (block {block}): {reason}")]
    KeyDecode {
        artifact: String,
        block: usize,
        reason: String,
    },

    #[error("failed to decode certificate {artifact} (block {block}): {reason}")]
    CertDecode {
        artifact: String,
        block: usize,
        reason: String,
    },

    /// Key and certificate decoded but could not be bundled
    #[error("failed to assemble archive from {key} and {cert}: {reason}")]
    Encode {
        key: String,
        cert: String,
        reason: String,
    },

    /// I/O failure unrelated to authorization or format
    #[error("store error: {0}")]
    Store(String),
}

impl BackendError {
    /// Attach artifact names to an archive failure
    pub(crate) fn from_archive(err: ArchiveError, key: &str, cert: &str) -> Self {
        match err {
            ArchiveError::KeyDecode { block, reason } => BackendError::KeyDecode {
                artifact: key.to_string(),
                block,
                reason,
            },
            ArchiveError::CertDecode { block, reason } => BackendError::CertDecode {
                artifact: cert.to_string(),
                block,
                reason,
            },
            ArchiveError::Encode(reason) => BackendError::Encode {
                key: key.to_string(),
                cert: cert.to_string(),
                reason,
            },
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidDomain(domain) => BackendError::InvalidDomain(domain),
            StoreError::NotFound(name) => BackendError::NotFound(name),
            other @ (StoreError::InvalidName(_)
            | StoreError::OutsideScope(_)
            | StoreError::Io { .. }) => BackendError::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_io_not_found_maps_to_not_found() {
        let err = StoreError::io(
            "example.com.key",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, StoreError::NotFound(ref name) if name == "example.com.key"));
    }

    #[test]
    fn test_store_error_conversion() {
        assert!(matches!(
            BackendError::from(StoreError::InvalidDomain("..".into())),
            BackendError::InvalidDomain(_)
        ));
        assert!(matches!(
            BackendError::from(StoreError::NotFound("a.key".into())),
            BackendError::NotFound(_)
        ));
        let err = BackendError::from(StoreError::io(
            "a.key",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ));
        assert!(matches!(err, BackendError::Store(ref msg) if msg.contains("a.key")));
    }

    #[test]
    fn test_archive_error_names_artifact() {
        let err = BackendError::from_archive(
            ArchiveError::CertDecode {
                block: 2,
                reason: "expected CERTIFICATE, found PRIVATE KEY".into(),
            },
            "example.com.key",
            "example.com.cert",
        );
        assert_eq!(
            err.to_string(),
            "failed to decode certificate example.com.cert (block 2): expected CERTIFICATE, found PRIVATE KEY"
        );
    }
}
