// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! ```toml
//! agent_command = "ssh buildhost tether-agent"
//! debounce_ms = 200
//! ignore = """
//! target
//! *.swp
//! """
//!
//! [[mapping]]
//! local = "/home/me/project"
//! remote = "work/project"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tether_adapters::{Skipper, SkipperError};
use tether_core::{Mapping, MappingError};
use thiserror::Error;

fn default_debounce_ms() -> u64 {
    200
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Skipper(#[from] SkipperError),
}

/// One replicated root as written in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingEntry {
    pub local: PathBuf,
    pub remote: PathBuf,
    /// Per-root override of the global ignore rules.
    #[serde(default)]
    pub ignore: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Shell command that starts the agent with the RPC pipe on stdio.
    pub agent_command: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Ignore rules in the `.gitignore` dialect, one pattern per line.
    #[serde(default)]
    pub ignore: String,
    #[serde(rename = "mapping")]
    pub mappings: Vec<MappingEntry>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Ok(toml::from_str(&text)?)
    }

    pub fn mapping(&self) -> Result<Mapping, ConfigError> {
        let pairs =
            self.mappings.iter().map(|m| (m.local.clone(), m.remote.clone())).collect();
        Ok(Mapping::new(pairs)?)
    }

    /// One compiled skipper per mapping entry, in mapping order.
    pub fn skippers(&self) -> Result<Vec<Skipper>, ConfigError> {
        self.mappings
            .iter()
            .map(|m| Ok(Skipper::compile(m.ignore.as_deref().unwrap_or(&self.ignore))?))
            .collect()
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
