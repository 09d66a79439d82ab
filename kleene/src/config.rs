use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use kleene_automata::CompileConfig;

/// A regex with the strings it must accept and reject.
/// The strings in `probe` are only simulated and printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Case {
    pub regex: String,
    #[serde(default)]
    pub accept: Vec<String>,
    #[serde(default)]
    pub reject: Vec<String>,
    #[serde(default)]
    pub probe: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub compile: CompileConfig,
    #[serde(rename = "case")]
    pub cases: Vec<Case>,
}

pub fn parse_config(text: &str) -> Result<DriverConfig> {
    let config = toml::from_str(text).context("Invalid config")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<DriverConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Cannot load {}", path.display()))
}
