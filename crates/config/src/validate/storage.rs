//! Storage and credential file validation

use super::{ErrorCategory, ValidationError, ValidationResult, ValidationWarning};
use crate::credentials::load_credentials;
use crate::Config;

/// Validate the artifact root and the credential file
pub fn validate_storage(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    let base_dir = &config.storage.base_dir;
    if !base_dir.exists() {
        result.add_error(ValidationError::new(
            ErrorCategory::Storage,
            format!("Storage directory not found: {:?}", base_dir),
        ));
    } else if !base_dir.is_dir() {
        result.add_error(ValidationError::new(
            ErrorCategory::Storage,
            format!("Storage path is not a directory: {:?}", base_dir),
        ));
    }

    match load_credentials(&config.auth.file) {
        Ok(credentials) if credentials.is_empty() => {
            result.add_warning(ValidationWarning::new(format!(
                "Credential file {:?} grants no access",
                config.auth.file
            )));
        }
        Ok(credentials) => {
            for domain in credentials.values() {
                if base_dir.is_dir() && !base_dir.join(domain).is_dir() {
                    result.add_warning(ValidationWarning::new(format!(
                        "Credential granted for '{}' but no such directory in {:?}",
                        domain, base_dir
                    )));
                }
            }
        }
        Err(e) => {
            result.add_error(ValidationError::new(ErrorCategory::Credentials, e.to_string()));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthConfig, StorageConfig};
    use std::fs;
    use tempfile::TempDir;

    fn config_in(temp_dir: &TempDir) -> Config {
        Config {
            storage: StorageConfig {
                base_dir: temp_dir.path().to_path_buf(),
            },
            auth: AuthConfig {
                file: temp_dir.path().join("auth.json"),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_storage_ok() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("example.com")).unwrap();
        fs::write(temp_dir.path().join("auth.json"), r#"{"k": "example.com"}"#).unwrap();

        let result = validate_storage(&config_in(&temp_dir));
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_storage_missing_dir_and_auth() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(&temp_dir);
        config.storage.base_dir = temp_dir.path().join("missing");

        let result = validate_storage(&config);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].category, ErrorCategory::Storage);
        assert_eq!(result.errors[1].category, ErrorCategory::Credentials);
    }

    #[test]
    fn test_validate_storage_warns_on_unknown_domain() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("auth.json"), r#"{"k": "ghost.com"}"#).unwrap();

        let result = validate_storage(&config_in(&temp_dir));
        assert!(result.is_ok());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("ghost.com"));
    }
}
