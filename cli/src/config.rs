use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::prep::PrepMode;

pub const DEFAULT_TEMPLATE_FILE: &str = "Sunday Template.pptx";
pub const DEFAULT_EXTENSION: &str = "pptx";

/// Root configuration structure. Deserialized from %APPDATA%\SundayPrep\config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Values used when the matching command-line flag is not given.
#[derive(Debug, Deserialize)]
pub struct Defaults {
    /// File name of the template inside `template_dir`.
    #[serde(default = "default_template_file")]
    pub template_file: String,
    /// Extension given to copies (without the dot).
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Directory holding the template and, in shortcut mode, the TODO shortcuts.
    /// `%VAR%` references are expanded at runtime. Falls back to the working directory.
    pub template_dir: Option<String>,
    /// Directory copies are written under. Falls back to the working directory.
    pub output_dir: Option<String>,
    #[serde(default)]
    pub mode: PrepMode,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            template_file: DEFAULT_TEMPLATE_FILE.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            template_dir: None,
            output_dir: None,
            mode: PrepMode::default(),
        }
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the file does not exist.
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_template_file() -> String {
    DEFAULT_TEMPLATE_FILE.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}
