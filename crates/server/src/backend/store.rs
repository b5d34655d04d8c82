//! Domain-scoped artifact storage
//!
//! Artifacts live in a hierarchical store with one subtree per domain:
//!
//! ```text
//! base-dir/
//! └── example.com/
//!     ├── example.com.meta    # Renewal metadata (key=value)
//!     ├── example.com.key     # RSA private key (PEM)
//!     ├── example.com.cert    # Leaf certificate, optionally followed by its chain
//!     └── fullchain.cert      # Full chain
//! ```
//!
//! A store hands out a [`DomainStore`] per domain; every read through it is
//! confined to that domain's subtree. Domains and artifact names are checked
//! as single path segments before any filesystem access.

use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use super::error::StoreError;

/// Longest accepted domain or artifact name
const MAX_SEGMENT_LEN: usize = 255;

/// Last-modified time and size of a stored artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactStat {
    pub mod_time: DateTime<Utc>,
    pub size: u64,
}

/// A read-only store holding one subtree per domain
pub trait ArtifactStore: Send + Sync {
    /// Scope all further access to one domain's subtree
    ///
    /// Fails with [`StoreError::InvalidDomain`] when `domain` is not a single
    /// plain path segment.
    fn scope(&self, domain: &str) -> Result<Box<dyn DomainStore>, StoreError>;
}

/// Read access to the artifacts of a single domain
#[async_trait]
pub trait DomainStore: Send + Sync {
    fn domain(&self) -> &str;

    async fn stat(&self, name: &str) -> Result<ArtifactStat, StoreError>;

    async fn read(&self, name: &str) -> Result<Bytes, StoreError>;
}

/// Whether `segment` names exactly one entry inside a directory
///
/// Rejects empty strings, `.` and `..`, separators of any host, drive
/// prefixes, NUL and other control characters.
pub fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= MAX_SEGMENT_LEN
        && segment != "."
        && segment != ".."
        && !segment
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':') || c.is_control())
}

fn check_domain(domain: &str) -> Result<(), StoreError> {
    if is_plain_segment(domain) {
        Ok(())
    } else {
        warn!(domain = %domain.escape_debug(), "Rejected domain that is not a plain path segment");
        Err(StoreError::InvalidDomain(domain.to_string()))
    }
}

/// Filesystem-backed artifact store rooted at a base directory
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactStore for FsArtifactStore {
    fn scope(&self, domain: &str) -> Result<Box<dyn DomainStore>, StoreError> {
        check_domain(domain)?;
        trace!(domain = %domain, "Scoped artifact store to domain");
        Ok(Box::new(FsDomainStore {
            domain: domain.to_string(),
            dir: self.root.join(domain),
        }))
    }
}

/// One domain's directory inside an [`FsArtifactStore`]
#[derive(Debug)]
struct FsDomainStore {
    domain: String,
    dir: PathBuf,
}

impl FsDomainStore {
    /// Resolve `name` to a canonical path that is still inside the domain directory
    async fn locate(&self, name: &str) -> Result<PathBuf, StoreError> {
        if !is_plain_segment(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        let dir = tokio::fs::canonicalize(&self.dir)
            .await
            .map_err(|e| StoreError::io(name, e))?;
        let path = tokio::fs::canonicalize(self.dir.join(name))
            .await
            .map_err(|e| StoreError::io(name, e))?;

        if !path.starts_with(&dir) {
            warn!(
                domain = %self.domain,
                artifact = %name,
                resolved = %path.display(),
                "Artifact resolves outside its domain directory"
            );
            return Err(StoreError::OutsideScope(name.to_string()));
        }

        Ok(path)
    }

    /// Like [`Self::locate`], but only regular files count as artifacts
    async fn locate_file(&self, name: &str) -> Result<(PathBuf, std::fs::Metadata), StoreError> {
        let path = self.locate(name).await?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| StoreError::io(name, e))?;

        if !metadata.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok((path, metadata))
    }
}

#[async_trait]
impl DomainStore for FsDomainStore {
    fn domain(&self) -> &str {
        &self.domain
    }

    async fn stat(&self, name: &str) -> Result<ArtifactStat, StoreError> {
        let (_, metadata) = self.locate_file(name).await?;

        let modified: SystemTime = metadata.modified().map_err(|e| StoreError::io(name, e))?;
        let stat = ArtifactStat {
            mod_time: DateTime::<Utc>::from(modified),
            size: metadata.len(),
        };

        trace!(
            domain = %self.domain,
            artifact = %name,
            size = stat.size,
            "Stat artifact"
        );
        Ok(stat)
    }

    async fn read(&self, name: &str) -> Result<Bytes, StoreError> {
        let (path, _) = self.locate_file(name).await?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::io(name, e))?;

        debug!(
            domain = %self.domain,
            artifact = %name,
            bytes = data.len(),
            "Read artifact"
        );
        Ok(Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, FsArtifactStore) {
        let temp_dir = TempDir::new().unwrap();
        let domain_dir = temp_dir.path().join("example.com");
        fs::create_dir_all(&domain_dir).unwrap();
        fs::write(domain_dir.join("example.com.key"), "key material").unwrap();
        let store = FsArtifactStore::new(temp_dir.path());
        (temp_dir, store)
    }

    #[test]
    fn test_plain_segments() {
        assert!(is_plain_segment("example.com"));
        assert!(is_plain_segment("*.example.com"));
        assert!(is_plain_segment("..."));
        assert!(!is_plain_segment(""));
        assert!(!is_plain_segment("."));
        assert!(!is_plain_segment(".."));
        assert!(!is_plain_segment("../other.com"));
        assert!(!is_plain_segment("a/b"));
        assert!(!is_plain_segment("a\\b"));
        assert!(!is_plain_segment("C:"));
        assert!(!is_plain_segment("a\0b"));
        assert!(!is_plain_segment(&"a".repeat(256)));
    }

    #[tokio::test]
    async fn test_read_and_stat() {
        let (_temp_dir, store) = setup_store();
        let scoped = store.scope("example.com").unwrap();
        assert_eq!(scoped.domain(), "example.com");

        let data = scoped.read("example.com.key").await.unwrap();
        assert_eq!(&data[..], b"key material");

        let stat = scoped.stat("example.com.key").await.unwrap();
        assert_eq!(stat.size, 12);
        assert!(stat.mod_time <= Utc::now());
    }

    #[tokio::test]
    async fn test_missing_artifact_and_domain() {
        let (_temp_dir, store) = setup_store();

        let scoped = store.scope("example.com").unwrap();
        assert!(matches!(
            scoped.read("example.com.cert").await,
            Err(StoreError::NotFound(_))
        ));

        let unknown = store.scope("unknown.com").unwrap();
        assert!(matches!(
            unknown.stat("unknown.com.key").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_is_not_an_artifact() {
        let (temp_dir, store) = setup_store();
        fs::create_dir(temp_dir.path().join("example.com").join("nested")).unwrap();

        let scoped = store.scope("example.com").unwrap();
        assert!(matches!(
            scoped.stat("nested").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            scoped.read("nested").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_scope_rejects_traversal() {
        let (_temp_dir, store) = setup_store();
        for domain in ["..", "../example.com", "example.com/../other", "/etc", ""] {
            assert!(
                matches!(store.scope(domain), Err(StoreError::InvalidDomain(_))),
                "domain {:?} should be rejected",
                domain
            );
        }
    }

    #[tokio::test]
    async fn test_names_are_single_segments() {
        let (_temp_dir, store) = setup_store();
        let scoped = store.scope("example.com").unwrap();
        assert!(matches!(
            scoped.read("../example.com/example.com.key").await,
            Err(StoreError::InvalidName(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_refused() {
        let (temp_dir, store) = setup_store();
        let other_dir = temp_dir.path().join("other.com");
        fs::create_dir_all(&other_dir).unwrap();
        fs::write(other_dir.join("other.com.key"), "other key").unwrap();
        std::os::unix::fs::symlink(
            other_dir.join("other.com.key"),
            temp_dir.path().join("example.com").join("stolen.key"),
        )
        .unwrap();

        let scoped = store.scope("example.com").unwrap();
        assert!(matches!(
            scoped.read("stolen.key").await,
            Err(StoreError::OutsideScope(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_separators_never_pass(prefix in "[a-z.]{0,10}", suffix in "[a-z.]{0,10}", sep in "[/\\\\]") {
            let domain = format!("{}{}{}", prefix, sep, suffix);
            prop_assert!(!is_plain_segment(&domain));
        }

        #[test]
        fn prop_hostnames_pass(domain in "[a-z0-9-]{1,20}(\\.[a-z0-9-]{1,20}){0,3}") {
            prop_assert!(is_plain_segment(&domain));
        }
    }
}
