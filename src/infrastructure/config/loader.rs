use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid cache capacity for {0}: must be at least 1")]
    InvalidCacheCapacity(&'static str),

    #[error("Queue name for {0} cannot be empty")]
    EmptyQueueName(&'static str),

    #[error("Exchange name for {0} cannot be empty")]
    EmptyExchangeName(&'static str),

    #[error("Fallback directory cannot be empty")]
    EmptyFallbackDir,

    #[error("Invalid http_timeout_secs: {0}. Must be at least 1")]
    InvalidHttpTimeout(u64),

    #[error("Invalid fallback_url: {0}. Must start with http:// or https://")]
    InvalidFallbackUrl(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Project config file, relative to the working directory.
    pub const PROJECT_FILE: &'static str = ".kibitzer/config.yaml";
    /// Optional local overrides.
    pub const LOCAL_FILE: &'static str = ".kibitzer/local.yaml";
    /// Prefix for environment overrides; nested keys split on `__`.
    pub const ENV_PREFIX: &'static str = "KIBITZER_";

    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .kibitzer/config.yaml
    /// 3. .kibitzer/local.yaml (optional)
    /// 4. Environment variables (KIBITZER_* prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(Self::PROJECT_FILE))
            .merge(Yaml::file(Self::LOCAL_FILE))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.cache.task_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity("task_capacity"));
        }
        if config.cache.evaluation_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity("evaluation_capacity"));
        }
        if config.cache.observation_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity("observation_capacity"));
        }

        if config.intake.submit_queues.is_empty()
            || config.intake.submit_queues.iter().any(|queue| queue.trim().is_empty())
        {
            return Err(ConfigError::EmptyQueueName("submit_queues"));
        }
        if config.intake.static_evaluation_queue.trim().is_empty() {
            return Err(ConfigError::EmptyQueueName("static_evaluation_queue"));
        }

        if config.publishing.evaluation_exchange.trim().is_empty() {
            return Err(ConfigError::EmptyExchangeName("evaluation_exchange"));
        }
        if config.publishing.static_evaluation_exchange.trim().is_empty() {
            return Err(ConfigError::EmptyExchangeName("static_evaluation_exchange"));
        }
        if config.publishing.fallback_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyFallbackDir);
        }
        if config.publishing.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidHttpTimeout(0));
        }
        if let Some(url) = &config.publishing.fallback_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidFallbackUrl(url.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{LogFormat, RotationPolicy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.intake.submit_delay_ms, 3000);
        assert_eq!(config.intake.submit_queues, vec!["submittaskcommand", "submittaskcommand2"]);
        assert_eq!(config.intake.static_evaluation_queue, "staticevaluationrequest");
        assert!(config.engine.wait_when_busy);
        assert_eq!(config.publishing.evaluation_exchange, "evaluation");
        assert_eq!(config.publishing.fallback_dir.to_str(), Some("unpublished"));
        assert_eq!(config.cache.task_capacity, 100);
        assert_eq!(config.cache.evaluation_capacity, 2000);
        assert_eq!(config.cache.observation_capacity, 10_000);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
logging:
  level: debug
  format: pretty
  rotation: hourly
intake:
  submit_delay_ms: 0
  submit_queues: [tasks]
engine:
  wait_when_busy: false
  syzygy_path: /srv/syzygy
publishing:
  fallback_url: http://collector.local/unpublished
cache:
  task_capacity: 5
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.rotation, RotationPolicy::Hourly);
        assert_eq!(config.intake.submit_delay_ms, 0);
        assert_eq!(config.intake.submit_queues, vec!["tasks"]);
        assert!(!config.engine.wait_when_busy);
        assert_eq!(config.engine.syzygy_path.as_deref(), Some("/srv/syzygy"));
        assert_eq!(config.cache.task_capacity, 5);
        assert_eq!(config.cache.evaluation_capacity, 2000);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_unknown_log_format_rejected_at_parse() {
        let yaml = "logging:\n  format: xml\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.cache.observation_capacity = 0;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidCacheCapacity("observation_capacity")
        ));
    }

    #[test]
    fn test_validate_empty_queue_names() {
        let mut config = Config::default();
        config.intake.submit_queues = vec![String::new()];
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyQueueName("submit_queues")
        ));

        let mut config = Config::default();
        config.intake.submit_queues.clear();
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_publishing() {
        let mut config = Config::default();
        config.publishing.http_timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidHttpTimeout(0)
        ));

        let mut config = Config::default();
        config.publishing.fallback_url = Some("ftp://somewhere".to_string());
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidFallbackUrl(_)
        ));

        let mut config = Config::default();
        config.publishing.evaluation_exchange = " ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyExchangeName("evaluation_exchange")
        ));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "intake:\n  submit_delay_ms: 250\nlogging:\n  level: warn").unwrap();
        file.flush().unwrap();

        temp_env::with_vars(
            [
                ("KIBITZER_LOGGING__LEVEL", Some("debug")),
                ("KIBITZER_CACHE__TASK_CAPACITY", Some("7")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.intake.submit_delay_ms, 250, "file value should apply");
                assert_eq!(config.logging.level, "debug", "env should win over file");
                assert_eq!(config.cache.task_capacity, 7);
            },
        );
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::load_from_file(dir.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cache:\n  evaluation_capacity: 0").unwrap();
        file.flush().unwrap();

        temp_env::with_vars_unset(["KIBITZER_CACHE__EVALUATION_CAPACITY"], || {
            assert!(ConfigLoader::load_from_file(file.path()).is_err());
        });
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(base_file, "intake:\n  submit_delay_ms: 100\nlogging:\n  level: info\n  format: pretty").unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "logging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.logging.level, "debug", "Override should win for nested fields");
        assert_eq!(config.logging.format, LogFormat::Pretty, "Base value should persist when not overridden");
        assert_eq!(config.intake.submit_delay_ms, 100);
    }
}
