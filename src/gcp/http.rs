//! HTTP utilities for GCP REST API calls

use crate::provider::ProviderError;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub fn sanitize_for_log(body: &str) -> String {
    let total = body.chars().count();
    let truncated = if total > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Strip the query string so tokens and filters never reach error messages
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(concat!("gcp2tf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &Url, token: &str) -> Result<Value, ProviderError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: redact(url),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}
