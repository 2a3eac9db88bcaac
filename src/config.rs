//! Configuration handling for the TUI

use crate::state::FormType;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable selecting the form shown at startup
pub const FORM_TYPE_ENV: &str = "FORMDECK_FORM_TYPE";

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SIMULATED_LATENCY_MS: u64 = 300;
const DEFAULT_TOAST_DURATION_MS: u64 = 3_000;

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Form shown at startup
    pub default_form_type: Option<FormType>,
    /// Give up on a configuration fetch after this many milliseconds
    pub fetch_timeout_ms: Option<u64>,
    /// Artificial delay applied by the built-in form catalog
    pub simulated_latency_ms: Option<u64>,
    /// How long a toast stays visible
    pub toast_duration_ms: Option<u64>,
}

impl AppConfig {
    /// Directory holding `config.json` and the optional `forms.json`
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("io", "formdeck", "formdeck").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Path of the optional form catalog override
    pub fn forms_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("forms.json"))
    }

    /// Load configuration from the user config directory
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.json")),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, falling back to defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms.unwrap_or(DEFAULT_FETCH_TIMEOUT_MS))
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(
            self.simulated_latency_ms
                .unwrap_or(DEFAULT_SIMULATED_LATENCY_MS),
        )
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms.unwrap_or(DEFAULT_TOAST_DURATION_MS))
    }

    /// Starting form, honouring the environment override
    pub fn starting_form_type(&self) -> FormType {
        self.resolve_form_type(std::env::var(FORM_TYPE_ENV).ok().as_deref())
    }

    fn resolve_form_type(&self, env_value: Option<&str>) -> FormType {
        let fallback = self.default_form_type.unwrap_or_default();
        match env_value.map(str::parse::<FormType>) {
            Some(Ok(form_type)) => form_type,
            Some(Err(err)) => {
                tracing::warn!("Ignoring {FORM_TYPE_ENV}: {err}");
                fallback
            }
            None => fallback,
        }
    }
}
