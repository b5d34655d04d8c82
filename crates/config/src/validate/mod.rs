//! Configuration validation
//!
//! Checks that the files a configuration points at exist and are usable
//! before the server starts serving.

mod certs;
mod lint;
mod storage;

use std::fmt;

use crate::Config;

pub use certs::validate_certificates;
pub use lint::lint_config;
pub use storage::validate_storage;

/// Validation error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Certificate,
    Storage,
    Credentials,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Certificate => f.write_str("certificate"),
            ErrorCategory::Storage => f.write_str("storage"),
            ErrorCategory::Credentials => f.write_str("credentials"),
        }
    }
}

/// A problem that prevents the configuration from being used
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: ErrorCategory,
    pub message: String,
}

impl ValidationError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// A problem worth reporting that does not block startup
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub message: String,
}

impl ValidationWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Collected errors and warnings
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run every check against `config`
pub fn validate_config(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.merge(validate_storage(config));
    result.merge(validate_certificates(config));
    result.merge(lint_config(config));
    result
}
