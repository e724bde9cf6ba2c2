//! Implementation of the `kibitzer config` command.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::cli::load_config;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub source: String,
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        let yaml = serde_yaml::to_string(&self.config).unwrap_or_default();
        format!("# effective configuration ({})\n{yaml}", self.source)
    }
}

pub async fn execute(config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = load_config(config_path).context("Failed to load configuration")?;
    let source = config_path.map_or_else(
        || "defaults, .kibitzer/config.yaml, .kibitzer/local.yaml, KIBITZER_*".to_string(),
        |path| path.display().to_string(),
    );
    output(&ConfigOutput { source, config }, json_mode);
    Ok(())
}
