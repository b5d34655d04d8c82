//! Certificate validation
//!
//! Validates the listener's TLS certificate: existence, parseability and
//! expiry.

use super::{ErrorCategory, ValidationError, ValidationResult, ValidationWarning};
use crate::Config;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Warn when the serving certificate expires within this window
const EXPIRY_WARNING_WINDOW: Duration = Duration::from_secs(30 * 86400);

/// Validate TLS certificates
pub fn validate_certificates(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    let Some(ref tls) = config.listener.tls else {
        return result;
    };

    if !tls.cert_file.exists() {
        result.add_error(ValidationError::new(
            ErrorCategory::Certificate,
            format!("Certificate not found: {:?}", tls.cert_file),
        ));
        return result;
    }

    if !tls.key_file.exists() {
        result.add_error(ValidationError::new(
            ErrorCategory::Certificate,
            format!("Private key not found: {:?}", tls.key_file),
        ));
        return result;
    }

    match load_and_validate_cert(&tls.cert_file) {
        Ok(Some(expiry_warning)) => result.add_warning(expiry_warning),
        Ok(None) => {}
        Err(e) => result.add_error(e),
    }

    result
}

/// Load a certificate and check its expiry
fn load_and_validate_cert(cert_path: &Path) -> Result<Option<ValidationWarning>, ValidationError> {
    use std::fs;

    let cert_pem = fs::read(cert_path).map_err(|e| {
        ValidationError::new(
            ErrorCategory::Certificate,
            format!("Failed to read certificate {:?}: {}", cert_path, e),
        )
    })?;

    // The first block is the serving certificate; any following blocks are its chain
    let pem = pem::parse(&cert_pem).map_err(|e| {
        ValidationError::new(
            ErrorCategory::Certificate,
            format!("Failed to parse certificate {:?}: {}", cert_path, e),
        )
    })?;

    let (_, cert) = x509_parser::parse_x509_certificate(pem.contents()).map_err(|e| {
        ValidationError::new(
            ErrorCategory::Certificate,
            format!("Invalid X509 certificate {:?}: {}", cert_path, e),
        )
    })?;

    let now = SystemTime::now();
    let not_after = cert.validity().not_after.timestamp().max(0) as u64;
    let expiry_time = SystemTime::UNIX_EPOCH + Duration::from_secs(not_after);

    if expiry_time < now {
        return Err(ValidationError::new(
            ErrorCategory::Certificate,
            format!(
                "Certificate expired: {:?} (expired at {})",
                cert_path,
                cert.validity().not_after
            ),
        ));
    }

    if expiry_time < now + EXPIRY_WARNING_WINDOW {
        return Ok(Some(ValidationWarning::new(format!(
            "Certificate expires soon: {:?} (expires at {})",
            cert_path,
            cert.validity().not_after
        ))));
    }

    Ok(None)
}
