use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid proxy port: 0 is not a connectable port")]
    InvalidProxyPort,

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .vigil/config.yaml (project config, created by init)
    /// 3. .vigil/local.yaml (project local overrides, optional)
    /// 4. Environment variables (VIGIL_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.vigil/) so one machine
    /// can host several supervised deployments.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".vigil/config.yaml"))
            .merge(Yaml::file(".vigil/local.yaml"))
            .merge(Env::prefixed("VIGIL_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("VIGIL_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.supervisor.proxy_port == 0 {
            return Err(ConfigError::InvalidProxyPort);
        }
        if config.supervisor.jar_path.is_empty() {
            return Err(ConfigError::EmptyField("supervisor.jar_path"));
        }
        if config.supervisor.java_path.is_empty() {
            return Err(ConfigError::EmptyField("supervisor.java_path"));
        }
        if config.supervisor.grace_period_secs == 0 {
            return Err(ConfigError::ZeroInterval("supervisor.grace_period_secs"));
        }

        if config.exchange.bridge_dir.is_empty() {
            return Err(ConfigError::EmptyField("exchange.bridge_dir"));
        }
        if config.exchange.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("exchange.poll_interval_ms"));
        }
        if config.exchange.crash_responder.is_empty() {
            return Err(ConfigError::EmptyField("exchange.crash_responder"));
        }
        if config.exchange.stuck_responder.is_empty() {
            return Err(ConfigError::EmptyField("exchange.stuck_responder"));
        }

        if config.detector.screenshot_dir.is_empty() {
            return Err(ConfigError::EmptyField("detector.screenshot_dir"));
        }
        if config.detector.stuck_threshold_secs == 0 {
            return Err(ConfigError::ZeroInterval("detector.stuck_threshold_secs"));
        }

        if config.watcher.check_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("watcher.check_interval_secs"));
        }

        if config.builder.build_command.is_empty() {
            return Err(ConfigError::EmptyField("builder.build_command"));
        }
        if config.builder.build_timeout_secs == 0 {
            return Err(ConfigError::ZeroInterval("builder.build_timeout_secs"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
        assert_eq!(config.watcher.max_restart_attempts, 3);
        assert_eq!(config.detector.stuck_threshold_secs, 300);
        assert_eq!(config.exchange.poll_interval_ms, 5000);
        assert_eq!(config.supervisor.proxy_port, 9150);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let config = Config {
            logging: crate::domain::models::LoggingConfig {
                level: "verbose".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = Config {
            watcher: crate::domain::models::WatcherConfig {
                check_interval_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroInterval("watcher.check_interval_secs"))
        ));

        let config = Config {
            exchange: crate::domain::models::ExchangeConfig {
                poll_interval_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "watcher:\n  max_restart_attempts: 5\nexchange:\n  crash_responder: jules\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.watcher.max_restart_attempts, 5);
        assert_eq!(config.exchange.crash_responder, "jules");
        // Untouched sections keep their defaults
        assert_eq!(config.watcher.check_interval_secs, 30);
    }
}
