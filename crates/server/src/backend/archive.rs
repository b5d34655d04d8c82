//! PKCS#12 archive assembly
//!
//! Builds a password-protected PKCS#12 container from a PEM private key and
//! a PEM certificate file. The certificate file holds the leaf first; any
//! further blocks are intermediates and are bundled as the chain in the
//! order they appear.
//!
//! # Password
//!
//! Archives are protected with [`DEFAULT_PASSWORD`], a well-known value that
//! existing consumers of these bundles expect. It provides no
//! confidentiality: the transport and the credential check are what protect
//! the key material. Key and certificate bags use PBE-SHA1-3DES so that older
//! PKCS#12 readers can open the bundle.

use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::X509;
use thiserror::Error;
use tracing::{debug, trace};

/// Password protecting every archive
pub const DEFAULT_PASSWORD: &str = "changeit";

const RSA_PRIVATE_KEY_TAG: &str = "RSA PRIVATE KEY";
const CERTIFICATE_TAG: &str = "CERTIFICATE";
const PEM_BEGIN: &[u8] = b"-----BEGIN ";

/// Reasons an archive cannot be assembled
///
/// Block indexes are zero-based positions within the respective PEM input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    #[error("private key block {block}: {reason}")]
    KeyDecode { block: usize, reason: String },

    #[error("certificate block {block}: {reason}")]
    CertDecode { block: usize, reason: String },

    #[error("PKCS#12 assembly failed: {0}")]
    Encode(String),
}

/// Bundle the key and the leaf certificate; blocks after the leaf are ignored
pub fn encode_single(key_pem: &[u8], cert_pem: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let key = decode_key(key_pem)?;
    let Some(leaf_block) = pem_blocks(cert_pem).first().copied() else {
        return Err(no_certificate());
    };
    let leaf = decode_certificate(0, leaf_block)?;

    build(&key, &leaf, Vec::new())
}

/// Bundle the key, the leaf certificate and every following certificate
pub fn encode_chain(key_pem: &[u8], cert_pem: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let key = decode_key(key_pem)?;
    let blocks = pem_blocks(cert_pem);

    let Some((leaf_block, chain_blocks)) = blocks.split_first() else {
        return Err(no_certificate());
    };

    let leaf = decode_certificate(0, leaf_block)?;
    let chain = chain_blocks
        .iter()
        .enumerate()
        .map(|(index, block)| decode_certificate(index + 1, block))
        .collect::<Result<Vec<_>, _>>()?;

    build(&key, &leaf, chain)
}

/// Decode a key file holding exactly one PKCS#1 RSA private key block
fn decode_key(key_pem: &[u8]) -> Result<PKey<Private>, ArchiveError> {
    let raw = match pem_blocks(key_pem).as_slice() {
        [] => {
            return Err(ArchiveError::KeyDecode {
                block: 0,
                reason: "no PEM block found".to_string(),
            })
        }
        [raw] => *raw,
        [_, extra, ..] => {
            let reason = match pem::parse(extra) {
                Ok(block) => format!("unexpected additional {} block", block.tag()),
                Err(e) => format!("unexpected additional block: {}", e),
            };
            return Err(ArchiveError::KeyDecode { block: 1, reason });
        }
    };

    let block = pem::parse(raw).map_err(|e| ArchiveError::KeyDecode {
        block: 0,
        reason: e.to_string(),
    })?;

    if block.tag() != RSA_PRIVATE_KEY_TAG {
        return Err(ArchiveError::KeyDecode {
            block: 0,
            reason: format!("expected {}, found {}", RSA_PRIVATE_KEY_TAG, block.tag()),
        });
    }

    let rsa = Rsa::private_key_from_der(block.contents()).map_err(|e| ArchiveError::KeyDecode {
        block: 0,
        reason: e.to_string(),
    })?;
    PKey::from_rsa(rsa).map_err(|e| ArchiveError::KeyDecode {
        block: 0,
        reason: e.to_string(),
    })
}

/// Split PEM input at each `-----BEGIN ` marker; text before the first marker is dropped
fn pem_blocks(input: &[u8]) -> Vec<&[u8]> {
    let starts: Vec<usize> = input
        .windows(PEM_BEGIN.len())
        .enumerate()
        .filter(|(_, window)| *window == PEM_BEGIN)
        .map(|(offset, _)| offset)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(input.len());
            &input[start..end]
        })
        .collect()
}

fn no_certificate() -> ArchiveError {
    ArchiveError::CertDecode {
        block: 0,
        reason: "no PEM block found".to_string(),
    }
}

fn decode_certificate(index: usize, raw: &[u8]) -> Result<X509, ArchiveError> {
    let block = pem::parse(raw).map_err(|e| ArchiveError::CertDecode {
        block: index,
        reason: e.to_string(),
    })?;
    if block.tag() != CERTIFICATE_TAG {
        return Err(ArchiveError::CertDecode {
            block: index,
            reason: format!("expected {}, found {}", CERTIFICATE_TAG, block.tag()),
        });
    }

    let cert = X509::from_der(block.contents()).map_err(|e| ArchiveError::CertDecode {
        block: index,
        reason: e.to_string(),
    })?;
    trace!(block = index, "Decoded certificate block");
    Ok(cert)
}

fn build(key: &PKey<Private>, leaf: &X509, chain: Vec<X509>) -> Result<Vec<u8>, ArchiveError> {
    let encode_err = |e: openssl::error::ErrorStack| ArchiveError::Encode(e.to_string());
    let chain_len = chain.len();

    let mut builder = Pkcs12::builder();
    builder
        .pkey(key)
        .cert(leaf)
        .key_algorithm(Nid::PBE_WITHSHA1AND3_KEY_TRIPLEDES_CBC)
        .cert_algorithm(Nid::PBE_WITHSHA1AND3_KEY_TRIPLEDES_CBC);

    if !chain.is_empty() {
        let mut stack = Stack::new().map_err(encode_err)?;
        for cert in chain {
            stack.push(cert).map_err(encode_err)?;
        }
        builder.ca(stack);
    }

    let der = builder
        .build2(DEFAULT_PASSWORD)
        .and_then(|archive| archive.to_der())
        .map_err(encode_err)?;

    debug!(chain_len, bytes = der.len(), "Assembled PKCS#12 archive");
    Ok(der)
}
