//! Operator command line.

pub mod commands;
pub mod output;
pub mod types;

use anyhow::Result;
use std::path::Path;

pub use types::{Cli, Commands};

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Load the explicit config file when given, the project hierarchy otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Report a failed command and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        eprintln!(
            "{}",
            serde_json::json!({ "success": false, "error": err.to_string(), "causes": chain })
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
