//! Configuration Management
//!
//! Persistent configuration for gcp2tf plus the validated settings the
//! pipeline runs with.

use crate::error::ExportError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_ZONE: &str = "us-central1-a";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Project to export from
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    /// Maximum detail calls in flight
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Items requested per page
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Base URL replacing every service endpoint
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

impl Config {
    /// Directory holding the config and log files
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcp2tf"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load configuration from the default location. A missing or unreadable
    /// file yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring config file {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path. Errors are reported.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective project (CLI > config > gcloud default)
    pub fn effective_project(&self, cli: Option<&str>) -> Option<String> {
        cli.map(String::from)
            .or_else(|| self.project_id.clone())
            .or_else(crate::gcp::auth::get_default_project)
            .filter(|p| !p.is_empty())
    }

    /// Get effective region (CLI > config > gcloud default > built-in)
    pub fn effective_region(&self, cli: Option<&str>) -> String {
        cli.map(String::from)
            .or_else(|| self.region.clone())
            .or_else(crate::gcp::auth::get_default_region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    /// Get effective zone (CLI > config > gcloud default > built-in)
    pub fn effective_zone(&self, cli: Option<&str>) -> String {
        cli.map(String::from)
            .or_else(|| self.zone.clone())
            .or_else(crate::gcp::auth::get_default_zone)
            .unwrap_or_else(|| DEFAULT_ZONE.to_string())
    }

    /// Get effective API endpoint override (CLI > config)
    pub fn effective_api_endpoint(&self, cli: Option<&str>) -> Option<String> {
        cli.map(String::from).or_else(|| self.api_endpoint.clone())
    }

    /// Pipeline settings with CLI values taking precedence
    pub fn settings(
        &self,
        concurrency: Option<usize>,
        page_size: Option<u32>,
    ) -> Result<PipelineSettings, ExportError> {
        PipelineSettings::new(
            concurrency
                .or(self.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
            page_size.or(self.page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// Validated knobs for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub concurrency: usize,
    pub page_size: u32,
}

impl PipelineSettings {
    pub fn new(concurrency: usize, page_size: u32) -> Result<Self, ExportError> {
        if concurrency == 0 {
            return Err(ExportError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(ExportError::Config("page size must be at least 1".to_string()));
        }
        Ok(Self {
            concurrency,
            page_size,
        })
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
