// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::models::{lookup, normalize_amount, CurrencyEntry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_ROOT: &str = "https://open.er-api.com/v6";
pub const DEFAULT_FLAG_PROVIDER: &str = "flagsapi.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_root: String,
    pub flag_provider: String,
    pub default_from: String,
    pub default_to: String,
    pub default_amount: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            flag_provider: DEFAULT_FLAG_PROVIDER.to_string(),
            default_from: "USD".to_string(),
            default_to: "INR".to_string(),
            default_amount: "1".to_string(),
        }
    }
}

/// Command-line values that win over the file and the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_root: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

fn get_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// Read a config file. A missing file yields the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if !config_path.exists() {
        if path.is_some() {
            anyhow::bail!("Config file {} does not exist", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_str = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;
    Ok(config)
}

pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let config_str = toml::to_string_pretty(config)?;
    fs::write(path, config_str)?;
    Ok(())
}

impl Config {
    /// File, then `FX_*` environment variables, then command-line flags.
    ///
    /// `.env` is loaded by `main` before this runs.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = load_config(path)?;
        config.apply_env(|key| env::var(key).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(api_root) = var("FX_API_ROOT") {
            self.api_root = api_root;
        }
        if let Some(provider) = var("FX_FLAG_PROVIDER") {
            self.flag_provider = provider;
        }
        if let Some(from) = var("FX_DEFAULT_FROM") {
            self.default_from = from;
        }
        if let Some(to) = var("FX_DEFAULT_TO") {
            self.default_to = to;
        }
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(api_root) = &overrides.api_root {
            self.api_root = api_root.clone();
        }
        if let Some(from) = &overrides.from {
            self.default_from = from.clone();
        }
        if let Some(to) = &overrides.to {
            self.default_to = to.clone();
        }
    }

    fn validate(&mut self) -> Result<()> {
        self.api_root = self.api_root.trim().trim_end_matches('/').to_string();
        if self.api_root.is_empty() {
            anyhow::bail!("api_root must not be empty");
        }

        self.default_from = resolve_currency(&self.default_from)?.code.to_string();
        self.default_to = resolve_currency(&self.default_to)?.code.to_string();
        self.default_amount = normalize_amount(&self.default_amount).display;
        Ok(())
    }

    pub fn from_currency(&self) -> Result<&'static CurrencyEntry> {
        resolve_currency(&self.default_from)
    }

    pub fn to_currency(&self) -> Result<&'static CurrencyEntry> {
        resolve_currency(&self.default_to)
    }
}

pub fn resolve_currency(code: &str) -> Result<&'static CurrencyEntry> {
    lookup(code.trim())
        .with_context(|| format!("Unknown currency code '{}' (see `fx-convert currencies`)", code))
}
