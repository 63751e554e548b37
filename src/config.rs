//! Demo configuration.
//!
//! Sources in priority order (lowest to highest):
//! 1. Code defaults
//! 2. TOML file from the `RENDEZVOUS_CONFIG_PATH` environment variable
//! 3. Environment variables (`RENDEZVOUS_VALUE`, `RENDEZVOUS_COUNT`,
//!    `RENDEZVOUS_LOG_LEVEL`)
//!
//! Command-line flags are merged on top by the binary.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment, Provider,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// ENV used to point at a TOML configuration file
pub const CONFIG_PATH_ENV: &str = "RENDEZVOUS_CONFIG_PATH";

const ENV_PREFIX: &str = "RENDEZVOUS_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// First value the producer sends.
    pub value: i64,

    /// How many values the producer sends before closing the channel.
    pub count: usize,

    /// Default log level when `RENDEZVOUS_LOG` is unset.
    pub log_level: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            value: 100,
            count: 1,
            log_level: "warn".to_string(),
        }
    }
}

impl DemoConfig {
    pub fn figment() -> Figment {
        let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_default();

        Figment::new()
            .merge(Serialized::defaults(DemoConfig::default()))
            .merge(Toml::file(&config_path))
            // RENDEZVOUS_LOG is the filter read by the subscriber, not a field.
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config_path", "log"]))
    }

    /// Load configuration from defaults, the config file and env.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::extract_from(Self::figment())
    }

    pub fn extract_from<T: Provider>(provider: T) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(provider)
            .extract()
            .map_err(|e| ConfigError::Extraction(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::Invalid(
                "count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(DemoConfig::default()))
    }

    #[test]
    fn defaults_send_one_hundred() {
        let config = DemoConfig::extract_from(defaults()).unwrap();

        assert_eq!(config.value, 100);
        assert_eq!(config.count, 1);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn toml_overrides_defaults() {
        let toml = r#"
            value = 7
            log_level = "debug"
        "#;
        let config = DemoConfig::extract_from(defaults().merge(Toml::string(toml))).unwrap();

        assert_eq!(config.value, 7);
        assert_eq!(config.count, 1);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn programmatic_override_wins() {
        let figment = defaults()
            .merge(Toml::string("count = 2"))
            .merge(("count", 5usize));

        assert_eq!(DemoConfig::extract_from(figment).unwrap().count, 5);
    }

    #[test]
    fn zero_count_is_rejected() {
        let err = DemoConfig::extract_from(defaults().merge(("count", 0usize))).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn wrong_type_fails_extraction() {
        let err =
            DemoConfig::extract_from(defaults().merge(Toml::string("value = \"lots\""))).unwrap_err();

        assert!(matches!(err, ConfigError::Extraction(_)));
    }
}
