//! File fallback sink: writes the unpublished payload under a local directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::domain::ports::FallbackSink;

/// `fallback_<exchange>_<yyyyMMdd-HHmm>.json`
pub fn fallback_file_name(exchange: &str, at: DateTime<Utc>) -> String {
    format!("fallback_{exchange}_{}.json", at.format("%Y%m%d-%H%M"))
}

pub struct FileFallbackSink {
    dir: PathBuf,
}

impl FileFallbackSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write(&self, exchange: &str, payload: &[u8]) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(fallback_file_name(exchange, Utc::now()));
        tokio::fs::write(&path, payload).await?;
        Ok(path)
    }
}

#[async_trait]
impl FallbackSink for FileFallbackSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn deliver(&self, exchange: &str, payload: &[u8]) {
        match self.write(exchange, payload).await {
            Ok(path) => tracing::info!(exchange, path = %path.display(), "payload written to fallback file"),
            Err(err) => {
                tracing::error!(exchange, dir = %self.dir.display(), error = %err, "fallback file write failed");
            }
        }
    }
}
