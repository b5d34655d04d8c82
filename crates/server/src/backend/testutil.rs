//! Key, certificate and artifact fixtures for backend tests.

use std::fs;
use std::path::Path;

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509NameBuilder, X509};

pub const META_CONTENT: &str = "\
Le_Domain='example.com'
Le_CertCreateTime='1700000000'
Le_NextRenewTime='1707000000'
Le_LinkCert='/etc/certs/live/example.com/cert123.pem'
";

pub fn rsa_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

pub fn ec_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

/// PKCS#1 PEM (`RSA PRIVATE KEY`) of an RSA key
pub fn rsa_key_pem(key: &PKey<Private>) -> Vec<u8> {
    key.rsa().unwrap().private_key_to_pem().unwrap()
}

/// Issue a certificate for `cn`, self-signed when `issuer` is `None`
pub fn issue(
    cn: &str,
    serial: u32,
    key: &PKey<Private>,
    issuer: Option<(&X509, &PKey<Private>)>,
) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", cn).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    match issuer {
        Some((issuer_cert, _)) => builder.set_issuer_name(issuer_cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&name).unwrap(),
    }
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(90).unwrap())
        .unwrap();

    let signing_key = issuer.map(|(_, issuer_key)| issuer_key).unwrap_or(key);
    builder.sign(signing_key, MessageDigest::sha256()).unwrap();
    builder.build()
}

/// A leaf certificate with its RSA key and two intermediates
pub struct Fixture {
    pub key: PKey<Private>,
    pub leaf: X509,
    pub intermediate_a: X509,
    pub intermediate_b: X509,
}

impl Fixture {
    /// Build the chain leaf ← intermediate A ← intermediate B (self-signed)
    pub fn new() -> Self {
        let key_b = ec_key();
        let intermediate_b = issue("Intermediate B", 30, &key_b, None);
        let key_a = ec_key();
        let intermediate_a = issue("Intermediate A", 20, &key_a, Some((&intermediate_b, &key_b)));
        let key = rsa_key();
        let leaf = issue("example.com", 10, &key, Some((&intermediate_a, &key_a)));

        Self {
            key,
            leaf,
            intermediate_a,
            intermediate_b,
        }
    }

    pub fn key_pem(&self) -> Vec<u8> {
        rsa_key_pem(&self.key)
    }

    pub fn leaf_pem(&self) -> Vec<u8> {
        self.leaf.to_pem().unwrap()
    }

    /// Leaf followed by intermediate A then intermediate B
    pub fn chain_pem(&self) -> Vec<u8> {
        let mut pem = self.leaf_pem();
        pem.extend(self.intermediate_a.to_pem().unwrap());
        pem.extend(self.intermediate_b.to_pem().unwrap());
        pem
    }

    /// Write the artifacts of `domain` under `root`
    pub fn write_domain(&self, root: &Path, domain: &str) {
        let dir = root.join(domain);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.meta", domain)), META_CONTENT).unwrap();
        fs::write(dir.join(format!("{}.key", domain)), self.key_pem()).unwrap();
        fs::write(dir.join(format!("{}.cert", domain)), self.chain_pem()).unwrap();
        fs::write(dir.join("fullchain.cert"), self.chain_pem()).unwrap();
    }
}
