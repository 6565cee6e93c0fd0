//! Runtime configuration.
//!
//! Settings come from an optional TOML file, then `.env` / process
//! environment overrides for the values that differ per workstation
//! (server URL and access token).

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model::{RecordError, Result, PARAM_DISCHARGE, STAGE_PARAMETERS};

pub const ENV_AQUARIUS_URL: &str = "AQUARIUS_URL";
pub const ENV_AQUARIUS_TOKEN: &str = "AQUARIUS_TOKEN";

/// Top-level configuration for one report-generation process.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RecordConfig {
    #[serde(default)]
    pub aquarius: AquariusSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Connection settings for the Aquarius Publish API.
#[derive(Debug, Clone, Deserialize)]
pub struct AquariusSettings {
    /// e.g. `https://aquarius.example.gov/AQUARIUS/Publish/v2`
    #[serde(default)]
    pub base_url: String,
    /// Pre-issued session token. Never read from the file in practice.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Knobs for the derived-metrics pass.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// Stage parameters tried in order when listing a site's GH timeseries.
    #[serde(default = "default_stage_parameters")]
    pub stage_parameters: Vec<String>,
    #[serde(default = "default_discharge_parameter")]
    pub discharge_parameter: String,
    /// Half-width of the recorder window fetched around a field reading.
    #[serde(default = "default_bordering_window_hours")]
    pub bordering_window_hours: i64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_stage_parameters() -> Vec<String> {
    STAGE_PARAMETERS.iter().map(|p| p.to_string()).collect()
}

fn default_discharge_parameter() -> String {
    PARAM_DISCHARGE.to_string()
}

fn default_bordering_window_hours() -> i64 {
    24
}

impl Default for AquariusSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            stage_parameters: default_stage_parameters(),
            discharge_parameter: default_discharge_parameter(),
            bordering_window_hours: default_bordering_window_hours(),
        }
    }
}

impl RecordConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RecordError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RecordError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if it exists (defaults otherwise), then apply `.env` and
    /// environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        dotenv::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production, a closure in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_AQUARIUS_URL).filter(|v| !v.trim().is_empty()) {
            self.aquarius.base_url = url;
        }
        if let Some(token) = lookup(ENV_AQUARIUS_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.aquarius.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.stage_parameters.is_empty() {
            return Err(RecordError::Config(
                "analysis.stage_parameters must name at least one parameter".to_string(),
            ));
        }
        if self.analysis.bordering_window_hours <= 0 {
            return Err(RecordError::Config(format!(
                "analysis.bordering_window_hours must be positive, got {}",
                self.analysis.bordering_window_hours
            )));
        }
        Ok(())
    }
}
