//! Best-effort destinations for payloads the broker would not take.

pub mod file;
pub mod http;

pub use file::{fallback_file_name, FileFallbackSink};
pub use http::HttpFallbackSink;
