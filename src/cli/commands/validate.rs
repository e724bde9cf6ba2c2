//! Implementation of the `kibitzer validate` command.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::adapters::messaging::dto::SubmitTaskCommand;
use crate::cli::output::{output, CommandOutput};

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub file: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        match &self.error {
            None => format!("{}: valid submission", self.file),
            Some(error) => format!("{}: invalid submission: {error}", self.file),
        }
    }
}

/// Check a payload the way the submission handler would.
pub fn validate_payload(payload: &[u8]) -> Result<SubmitTaskCommand> {
    let command: SubmitTaskCommand = serde_json::from_slice(payload).context("payload is not a task submission")?;
    command.validate()?;
    Ok(command)
}

pub async fn execute(file: &Path, json_mode: bool) -> Result<()> {
    let payload = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let result = validate_payload(&payload);

    let out = ValidateOutput {
        file: file.display().to_string(),
        valid: result.is_ok(),
        error: result.as_ref().err().map(|err| format!("{err:#}")),
    };
    output(&out, json_mode);

    match result {
        Ok(_) => Ok(()),
        Err(err) => Err(err.context(format!("{} failed validation", file.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_payload() {
        assert!(validate_payload(br#"{"fen":"8/8/8/8/8/8/8/K1k5 w - - 0 1","initialPv":1,"maxDepth":10}"#).is_ok());
        assert!(validate_payload(br#"{"fen":"x","pgn":"1. e4","initialPv":1,"maxDepth":10}"#).is_err());
        assert!(validate_payload(b"not json").is_err());
    }
}
