//! Item kind to artifact name mapping.

use certvault_common::ItemKind;

/// Name of the full-chain artifact inside every domain directory
pub const CHAIN_ARTIFACT: &str = "fullchain.cert";

/// Physical artifacts backing one item kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifacts {
    /// `key=value` renewal metadata, served as JSON
    Metadata(String),
    /// PEM material served as stored
    Pem(String),
    /// Key and certificate combined into a PKCS#12 archive
    Archive {
        key: String,
        cert: String,
        with_chain: bool,
    },
}

impl Artifacts {
    /// Artifact whose stat describes the resulting item
    ///
    /// For archives this is the certificate: the archive is rebuilt whenever
    /// the certificate is renewed.
    pub fn stat_name(&self) -> &str {
        match self {
            Artifacts::Metadata(name) | Artifacts::Pem(name) => name,
            Artifacts::Archive { cert, .. } => cert,
        }
    }
}

pub fn meta_name(domain: &str) -> String {
    format!("{}.meta", domain)
}

pub fn key_name(domain: &str) -> String {
    format!("{}.key", domain)
}

pub fn cert_name(domain: &str) -> String {
    format!("{}.cert", domain)
}

/// Map `kind` to the artifacts of `domain` it is built from
pub fn resolve(domain: &str, kind: ItemKind) -> Artifacts {
    match kind {
        ItemKind::Info => Artifacts::Metadata(meta_name(domain)),
        ItemKind::Key => Artifacts::Pem(key_name(domain)),
        ItemKind::Cert => Artifacts::Pem(cert_name(domain)),
        ItemKind::CertChain => Artifacts::Pem(CHAIN_ARTIFACT.to_string()),
        ItemKind::ArchiveSingle | ItemKind::ArchiveChain => Artifacts::Archive {
            key: key_name(domain),
            cert: cert_name(domain),
            with_chain: kind == ItemKind::ArchiveChain,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_table() {
        let domain = "example.com";
        assert_eq!(
            resolve(domain, ItemKind::Info),
            Artifacts::Metadata("example.com.meta".into())
        );
        assert_eq!(
            resolve(domain, ItemKind::Key),
            Artifacts::Pem("example.com.key".into())
        );
        assert_eq!(
            resolve(domain, ItemKind::Cert),
            Artifacts::Pem("example.com.cert".into())
        );
        assert_eq!(
            resolve(domain, ItemKind::CertChain),
            Artifacts::Pem("fullchain.cert".into())
        );

        for (kind, with_chain) in [(ItemKind::ArchiveSingle, false), (ItemKind::ArchiveChain, true)] {
            assert_eq!(
                resolve(domain, kind),
                Artifacts::Archive {
                    key: "example.com.key".into(),
                    cert: "example.com.cert".into(),
                    with_chain,
                }
            );
        }
    }

    #[test]
    fn test_stat_name_for_archives_is_certificate() {
        let artifacts = resolve("example.com", ItemKind::ArchiveChain);
        assert_eq!(artifacts.stat_name(), "example.com.cert");
        assert_eq!(resolve("a.org", ItemKind::Key).stat_name(), "a.org.key");
    }

    #[test]
    fn test_every_kind_resolves() {
        for kind in ItemKind::ALL {
            assert!(!resolve("example.com", kind).stat_name().is_empty());
        }
    }
}
