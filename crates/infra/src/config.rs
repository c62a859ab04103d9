//! Process configuration read from the environment.

use storefront_observability::{LogFormat, ParseLogFormatError};
use thiserror::Error;

/// Default log filter when neither `RUST_LOG` nor `STOREFRONT_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Products seeded per demo collection.
pub const DEFAULT_DEMO_PRODUCTS: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    LogFormat {
        var: &'static str,
        #[source]
        source: ParseLogFormatError,
    },

    #[error("{var}: expected a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub log_filter: String,
    pub log_format: LogFormat,
    pub demo_products: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::default(),
            demo_products: DEFAULT_DEMO_PRODUCTS,
        }
    }
}

impl StoreConfig {
    pub const LOG_VAR: &'static str = "STOREFRONT_LOG";
    pub const LOG_FORMAT_VAR: &'static str = "STOREFRONT_LOG_FORMAT";
    pub const DEMO_PRODUCTS_VAR: &'static str = "STOREFRONT_DEMO_PRODUCTS";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Unset or blank variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(filter) = get(Self::LOG_VAR) {
            config.log_filter = filter;
        }
        if let Some(format) = get(Self::LOG_FORMAT_VAR) {
            config.log_format = format.parse().map_err(|source| ConfigError::LogFormat {
                var: Self::LOG_FORMAT_VAR,
                source,
            })?;
        }
        if let Some(count) = get(Self::DEMO_PRODUCTS_VAR) {
            config.demo_products = count.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: Self::DEMO_PRODUCTS_VAR,
                value: count.clone(),
            })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.demo_products, 3);
    }

    #[test]
    fn reads_every_variable() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("STOREFRONT_LOG", "storefront_infra=debug"),
            ("STOREFRONT_LOG_FORMAT", "text"),
            ("STOREFRONT_DEMO_PRODUCTS", "7"),
        ]))
        .unwrap();
        assert_eq!(config.log_filter, "storefront_infra=debug");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.demo_products, 7);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[("STOREFRONT_LOG", "  ")])).unwrap();
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = StoreConfig::from_lookup(lookup(&[("STOREFRONT_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::LogFormat { var: "STOREFRONT_LOG_FORMAT", .. }));

        let err =
            StoreConfig::from_lookup(lookup(&[("STOREFRONT_DEMO_PRODUCTS", "-1")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: "STOREFRONT_DEMO_PRODUCTS",
                value: "-1".to_string(),
            }
        );
    }
}
