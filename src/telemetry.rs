//! Tracing setup.

use tracing_subscriber::EnvFilter;

use crate::errors::CommerceError;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Returns `Ok(false)` if a
/// subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> Result<bool, CommerceError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| CommerceError::ConfigError(format!("invalid log filter: {e}")))?,
    };

    Ok(tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing("debug").expect("first init");
        let second = init_tracing("debug").expect("second init");
        assert!(!second);
    }

    #[test]
    fn test_bad_filter_rejected() {
        if std::env::var_os("RUST_LOG").is_none() {
            let result = init_tracing("storefront_commerce=loudest");
            assert!(matches!(result, Err(CommerceError::ConfigError(_))));
        }
    }
}
