//! Provider API seam
//!
//! The pipeline only talks to the cloud through this trait: one paginated
//! `list` call and one `describe` call. [`crate::gcp::client::GcpClient`] is the
//! production implementation; tests plug in in-memory stubs.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Where the items of a list response live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemsPath {
    /// Dot-separated path to a plain array, e.g. `items` or `managedZones`
    Field(String),
    /// Compute aggregated list: `items` maps each scope to `{ <key>: [...] }`
    Aggregated(String),
}

impl ItemsPath {
    /// Pull the items out of one response page
    pub fn extract(&self, response: &Value) -> Vec<Value> {
        match self {
            ItemsPath::Field(path) => {
                let mut current = response;
                for part in path.split('.').filter(|p| !p.is_empty()) {
                    current = match current.get(part) {
                        Some(v) => v,
                        None => return Vec::new(),
                    };
                }
                current.as_array().cloned().unwrap_or_default()
            }
            ItemsPath::Aggregated(key) => {
                let Some(scopes) = response.get("items").and_then(|v| v.as_object()) else {
                    return Vec::new();
                };

                let mut scoped_items: Vec<(&String, &Value)> = scopes.iter().collect();
                scoped_items.sort_by(|a, b| a.0.cmp(b.0));

                let mut items = Vec::new();
                for (_scope, scoped) in scoped_items {
                    if let Some(arr) = scoped.get(key).and_then(|v| v.as_array()) {
                        items.extend(arr.iter().cloned());
                    }
                }
                items
            }
        }
    }
}

/// A request for one resource collection
#[derive(Debug, Clone)]
pub struct ListRequest {
    /// Resource kind key, used in logs and errors
    pub kind: String,
    /// Service the path is relative to (`compute`, `storage`, `iam`, `dns`)
    pub service: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub items: ItemsPath,
    pub page_size: u32,
    /// Query parameter carrying the page size (`maxResults`, `pageSize`)
    pub page_size_param: String,
}

/// A request for the details of a single resource
#[derive(Debug, Clone)]
pub struct DescribeRequest {
    pub service: String,
    pub path: String,
}

/// One page of a list response
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Value>,
    /// Continuation token; `None` ends the iteration
    pub next_token: Option<String>,
}

impl Page {
    /// Build a page from a raw response, normalising empty tokens to `None`
    pub fn from_response(response: &Value, items: &ItemsPath) -> Self {
        let next_token = response
            .get("nextPageToken")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Self {
            items: items.extract(response),
            next_token,
        }
    }
}

/// Failure of a single provider call
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("failed to reach the API: {0}")]
    Transport(String),

    #[error("failed to decode API response: {0}")]
    Decode(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("unknown service: {0}")]
    UnknownService(String),
}

impl ProviderError {
    /// Whether a retry could plausibly succeed. Informational only: the pipeline never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Transport(_) => true,
            _ => false,
        }
    }

    /// Human-readable hint that does not leak API details
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Status { status: 401, .. } => {
                "Authentication failed. Run 'gcloud auth application-default login'.".to_string()
            }
            ProviderError::Status { status: 403, .. } => {
                "Permission denied. Check your GCP IAM permissions.".to_string()
            }
            ProviderError::Status { status: 404, .. } => "Resource not found.".to_string(),
            ProviderError::Status { status: 429, .. } => {
                "Rate limit exceeded. Lower --concurrency and try again.".to_string()
            }
            ProviderError::Status { status: 400, .. } => {
                "Invalid request. Check your parameters.".to_string()
            }
            ProviderError::Status { status, .. } if *status >= 500 => {
                "GCP service temporarily unavailable. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Management API consumed by the pipeline
#[async_trait]
pub trait Provider: Send + Sync {
    /// Fetch one page of a collection
    async fn list(
        &self,
        request: &ListRequest,
        page_token: Option<&str>,
    ) -> Result<Page, ProviderError>;

    /// Fetch the details of one resource
    async fn describe(&self, request: &DescribeRequest) -> Result<Value, ProviderError>;
}
