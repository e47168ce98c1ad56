use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cmd;
use crate::paths;

#[derive(Debug, Error)]
pub enum CondaError {
    #[error("'{0}' not found in PATH (is the package manager installed?)")]
    ProgramMissing(String),

    #[error("environment '{0}' not found")]
    EnvNotFound(String),
}

/// Payload of `conda env list --json`
#[derive(Debug, Deserialize)]
struct EnvList {
    #[serde(default)]
    envs: Vec<PathBuf>,
}

/// Thin wrapper over the conda CLI (mamba/micromamba work as drop-ins)
#[derive(Debug, Clone)]
pub struct Conda {
    program: String,
}

impl Default for Conda {
    fn default() -> Self {
        Self::new()
    }
}

impl Conda {
    pub fn new() -> Self {
        Self::with_program(paths::DEFAULT_CONDA_PROGRAM)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Probe PATH before starting the pipeline so a missing binary fails
    /// with one readable line instead of five spawn errors
    pub fn ensure_available(&self) -> Result<()> {
        which::which(&self.program)
            .map_err(|_| CondaError::ProgramMissing(self.program.clone()))?;
        Ok(())
    }

    /// Append a channel to the package manager's global configuration.
    /// Duplicate adds are the tool's problem; it treats them as a no-op.
    pub fn add_channel(&self, channel: &str) -> Result<()> {
        cmd::run(&self.program, ["config", "--add", "channels", channel])
            .with_context(|| format!("Failed to register channel '{}'", channel))
    }

    /// Create a named environment from a pinned dependency spec file.
    /// The spec is opaque bytes here; resolution and validation belong to
    /// the package manager, whose failure propagates verbatim.
    pub fn create_env(&self, name: &str, spec: &Path) -> Result<()> {
        cmd::run(&self.program, create_args(name, spec))
            .with_context(|| format!("Failed to create environment '{}'", name))
    }

    pub fn env_exists(&self, name: &str) -> Result<bool> {
        Ok(find_env(&self.list_envs()?, name).is_some())
    }

    /// Resolve the root directory of a named environment. This is the
    /// activation step modeled as an explicit return value: later steps take
    /// the resolved root by parameter instead of reading process state.
    pub fn env_root(&self, name: &str) -> Result<PathBuf> {
        let envs = self.list_envs()?;
        find_env(&envs, name)
            .cloned()
            .ok_or_else(|| CondaError::EnvNotFound(name.to_string()).into())
    }

    fn list_envs(&self) -> Result<Vec<PathBuf>> {
        let out = cmd::run_output(&self.program, ["env", "list", "--json"])?;
        let parsed: EnvList =
            serde_json::from_str(&out).context("Failed to parse environment list JSON")?;
        Ok(parsed.envs)
    }
}

fn create_args(name: &str, spec: &Path) -> Vec<String> {
    vec![
        "create".into(),
        "--yes".into(),
        "--name".into(),
        name.into(),
        "--file".into(),
        spec.to_string_lossy().into_owned(),
    ]
}

/// Environments are listed as absolute prefixes; the name is the last segment
fn find_env<'a>(envs: &'a [PathBuf], name: &str) -> Option<&'a PathBuf> {
    envs.iter()
        .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_args_pin_name_and_spec() {
        let args = create_args("dev", Path::new("requirements.txt"));
        assert_eq!(
            args,
            ["create", "--yes", "--name", "dev", "--file", "requirements.txt"]
        );
    }

    #[test]
    fn find_env_matches_on_last_segment() {
        let envs = vec![
            PathBuf::from("/opt/conda"),
            PathBuf::from("/opt/conda/envs/dev"),
            PathBuf::from("/opt/conda/envs/other"),
        ];
        assert_eq!(
            find_env(&envs, "dev"),
            Some(&PathBuf::from("/opt/conda/envs/dev"))
        );
        assert_eq!(find_env(&envs, "missing"), None);
    }

    #[test]
    fn find_env_does_not_match_substrings() {
        let envs = vec![PathBuf::from("/opt/conda/envs/dev-extra")];
        assert_eq!(find_env(&envs, "dev"), None);
    }

    #[test]
    fn env_list_json_parses() {
        let json = r#"{"envs": ["/opt/conda", "/opt/conda/envs/dev"]}"#;
        let parsed: EnvList = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.envs.len(), 2);
    }

    #[test]
    fn env_list_json_tolerates_missing_envs_key() {
        let parsed: EnvList = serde_json::from_str("{}").unwrap();
        assert!(parsed.envs.is_empty());
    }

    #[test]
    fn env_not_found_message_names_the_environment() {
        let err = CondaError::EnvNotFound("dev".into());
        assert_eq!(err.to_string(), "environment 'dev' not found");
    }
}
