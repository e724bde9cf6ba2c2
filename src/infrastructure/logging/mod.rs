//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - Optional rolling JSON file output via tracing-appender

pub mod logger;

pub use logger::{LoggerImpl, LOG_FILE_NAME};
