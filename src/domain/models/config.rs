use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for kibitzer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Inbound message handling
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Engine scheduling
    #[serde(default)]
    pub engine: EngineConfig,

    /// Outbound publication and fallback sinks
    #[serde(default)]
    pub publishing: PublishingConfig,

    /// Cache capacities
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for log files; stdout only when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy for file output
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

/// Inbound message handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IntakeConfig {
    /// Delay before a task submission is processed, in milliseconds
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    /// Queues carrying task submissions
    #[serde(default = "default_submit_queues")]
    pub submit_queues: Vec<String>,

    /// Queue carrying static evaluation requests
    #[serde(default = "default_static_evaluation_queue")]
    pub static_evaluation_queue: String,
}

const fn default_submit_delay_ms() -> u64 {
    3000
}

fn default_submit_queues() -> Vec<String> {
    vec!["submittaskcommand".to_string(), "submittaskcommand2".to_string()]
}

fn default_static_evaluation_queue() -> String {
    "staticevaluationrequest".to_string()
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: default_submit_delay_ms(),
            submit_queues: default_submit_queues(),
            static_evaluation_queue: default_static_evaluation_queue(),
        }
    }
}

/// Engine scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Block until the engine is free; when false a busy engine requeues the submission
    #[serde(default = "default_wait_when_busy")]
    pub wait_when_busy: bool,

    /// Hostname recorded on runs; falls back to the HOSTNAME env var
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Tablebase directory injected as `SyzygyPath` for runs that ask for it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syzygy_path: Option<String>,
}

const fn default_wait_when_busy() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wait_when_busy: default_wait_when_busy(),
            hostname: None,
            syzygy_path: None,
        }
    }
}

/// Publication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PublishingConfig {
    /// Exchange receiving final evaluations
    #[serde(default = "default_evaluation_exchange")]
    pub evaluation_exchange: String,

    /// Exchange receiving static evaluations
    #[serde(default = "default_static_evaluation_exchange")]
    pub static_evaluation_exchange: String,

    /// HTTP endpoint receiving payloads the broker rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,

    /// Directory receiving payloads the broker rejected
    #[serde(default = "default_fallback_dir")]
    pub fallback_dir: PathBuf,

    /// Timeout for the HTTP fallback, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_evaluation_exchange() -> String {
    "evaluation".to_string()
}

fn default_static_evaluation_exchange() -> String {
    "staticevaluation".to_string()
}

fn default_fallback_dir() -> PathBuf {
    PathBuf::from("unpublished")
}

const fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            evaluation_exchange: default_evaluation_exchange(),
            static_evaluation_exchange: default_static_evaluation_exchange(),
            fallback_url: None,
            fallback_dir: default_fallback_dir(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Cache capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    #[serde(default = "default_task_capacity")]
    pub task_capacity: usize,

    #[serde(default = "default_evaluation_capacity")]
    pub evaluation_capacity: usize,

    #[serde(default = "default_observation_capacity")]
    pub observation_capacity: usize,
}

const fn default_task_capacity() -> usize {
    100
}

const fn default_evaluation_capacity() -> usize {
    2000
}

const fn default_observation_capacity() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            task_capacity: default_task_capacity(),
            evaluation_capacity: default_evaluation_capacity(),
            observation_capacity: default_observation_capacity(),
        }
    }
}
