//! Type definitions for the storefront

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::CommerceError;

pub mod context;
pub mod product_catalog;

/// Largest accepted image upload (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Store configuration, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store display name, used in e-mails.
    pub store_name:            String,
    /// Currency code (ISO 4217) all amounts are denominated in.
    pub currency:              String,
    /// Prefix of human-readable order numbers.
    pub order_number_prefix:   String,
    /// Sender address for transactional e-mail.
    pub sender_email:          String,
    /// Maximum upload size in bytes.
    pub max_upload_bytes:      u64,
    /// Accepted image MIME types.
    pub allowed_image_types:   Vec<String>,
    /// Whether the card payment method is offered at all.
    pub card_payments_enabled: bool,
    /// Default tracing filter directive.
    pub log_filter:            String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_name:            "Storefront".to_string(),
            currency:              "BDT".to_string(),
            order_number_prefix:   "ORD".to_string(),
            sender_email:          "orders@storefront.local".to_string(),
            max_upload_bytes:      DEFAULT_MAX_UPLOAD_BYTES,
            allowed_image_types:   vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "image/gif".to_string(),
            ],
            card_payments_enabled: false,
            log_filter:            "info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, CommerceError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| CommerceError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CommerceError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Checks the configuration for unusable values.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.order_number_prefix.trim().is_empty() {
            return Err(CommerceError::ConfigError(
                "order_number_prefix must not be empty".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(CommerceError::ConfigError(
                "max_upload_bytes must be positive".to_string(),
            ));
        }
        if self.allowed_image_types.is_empty() {
            return Err(CommerceError::ConfigError(
                "allowed_image_types must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.order_number_prefix, "ORD");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert!(!config.card_payments_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StoreConfig::from_toml_str(
            r#"
            store_name = "Glow Botanicals"
            order_number_prefix = "GLW"
            "#,
        )
        .expect("parse");

        assert_eq!(config.store_name, "Glow Botanicals");
        assert_eq!(config.order_number_prefix, "GLW");
        assert_eq!(config.allowed_image_types.len(), 4);
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let result = StoreConfig::from_toml_str(r#"order_number_prefix = " ""#);
        assert!(matches!(result, Err(CommerceError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "card_payments_enabled = true").expect("write");

        let config = StoreConfig::load(file.path()).expect("load");
        assert!(config.card_payments_enabled);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = StoreConfig::load("/nonexistent/storefront.toml");
        assert!(matches!(result, Err(CommerceError::ConfigError(_))));
    }
}
