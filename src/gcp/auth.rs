//! GCP Authentication
//!
//! Access tokens come either from an explicitly supplied OAuth token or from
//! Application Default Credentials (service account keys, gcloud user
//! credentials, metadata server). Default project, region and zone are read
//! from the environment and the gcloud configuration directory.

use crate::error::ExportError;
use crate::provider::ProviderError;
use gcp_auth::TokenProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for GCP API access
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Environment variable holding a pre-issued access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
enum TokenSource {
    /// Token supplied by the caller, used as is
    Static(String),
    Adc(Arc<dyn TokenProvider>),
}

/// GCP credentials holder with token caching
#[derive(Clone)]
pub struct GcpCredentials {
    source: TokenSource,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl GcpCredentials {
    /// Credentials backed by a fixed access token
    pub fn from_token(token: &str) -> Result<Self, ExportError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ExportError::Credential("access token is empty".to_string()));
        }

        Ok(Self {
            source: TokenSource::Static(token.to_string()),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Credentials from Application Default Credentials
    pub async fn application_default() -> Result<Self, ExportError> {
        let provider = gcp_auth::provider().await.map_err(|e| {
            ExportError::Credential(format!(
                "{}. Run 'gcloud auth application-default login' or pass --access-token",
                e
            ))
        })?;

        Ok(Self {
            source: TokenSource::Adc(provider),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Explicit token when given, otherwise ADC
    pub async fn resolve(access_token: Option<&str>) -> Result<Self, ExportError> {
        match access_token {
            Some(token) => {
                tracing::debug!("Using explicitly supplied access token");
                Self::from_token(token)
            }
            None => Self::application_default().await,
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String, ProviderError> {
        let provider = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::Adc(provider) => provider,
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let token = provider
            .token(DEFAULT_SCOPES)
            .await
            .map_err(|e| ProviderError::Auth(e.to_string()))?;
        let token_str = token.as_str().to_string();

        // gcp_auth does not expose a usable expiry here, so assume a conservative TTL
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;
        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token_str)
    }
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Read `key` from `[section]` of the active gcloud configuration,
/// falling back to the legacy top-level `properties` file.
pub fn read_gcloud_property(config_dir: &Path, section: &str, key: &str) -> Option<String> {
    if let Ok(active_config) = std::fs::read_to_string(config_dir.join("active_config")) {
        let config_name = active_config.trim();

        // Security: Validate config name to prevent path traversal
        if !config_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            tracing::warn!("Invalid characters in active_config name");
            return None;
        }

        let config_path = config_dir
            .join("configurations")
            .join(format!("config_{}", config_name));
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Some(value) = find_property(&content, section, key) {
                return Some(value);
            }
        }
    }

    let content = std::fs::read_to_string(config_dir.join("properties")).ok()?;
    find_property(&content, section, key)
}

/// Look up `key` inside `[section]` of an INI-style document
fn find_property(content: &str, section: &str, key: &str) -> Option<String> {
    let header = format!("[{}]", section);
    let mut in_section = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line == header;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((name, value)) = line.split_once('=') {
            if name.trim() == key {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// Read the default project from the environment or gcloud configuration
/// Security: Validates project ID format before returning
pub fn get_default_project() -> Option<String> {
    for var in ["CLOUDSDK_CORE_PROJECT", "GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"] {
        if let Ok(project) = std::env::var(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }

    let config_dir = get_gcloud_config_dir()?;
    read_gcloud_property(&config_dir, "core", "project").filter(|p| validate_project_id(p))
}

/// Get the default region from the environment or gcloud configuration
pub fn get_default_region() -> Option<String> {
    if let Ok(region) = std::env::var("CLOUDSDK_COMPUTE_REGION") {
        return Some(region);
    }

    let config_dir = get_gcloud_config_dir()?;
    read_gcloud_property(&config_dir, "compute", "region")
}

/// Get the default zone from the environment or gcloud configuration
pub fn get_default_zone() -> Option<String> {
    if let Ok(zone) = std::env::var("CLOUDSDK_COMPUTE_ZONE") {
        return Some(zone);
    }

    let config_dir = get_gcloud_config_dir()?;
    read_gcloud_property(&config_dir, "compute", "zone")
}
