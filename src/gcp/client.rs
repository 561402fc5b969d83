//! GCP Client
//!
//! Combines authentication and HTTP plumbing into the [`Provider`] the
//! pipeline talks to.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use crate::provider::{DescribeRequest, ListRequest, Page, Provider, ProviderError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Base URL per service
#[derive(Debug, Clone)]
pub struct Endpoints {
    bases: BTreeMap<String, Url>,
}

impl Endpoints {
    /// Public Google endpoints
    pub fn google() -> Result<Self, ProviderError> {
        let mut bases = BTreeMap::new();
        for (service, base) in [
            ("compute", "https://compute.googleapis.com/"),
            ("storage", "https://storage.googleapis.com/"),
            ("iam", "https://iam.googleapis.com/"),
            ("dns", "https://dns.googleapis.com/"),
        ] {
            bases.insert(service.to_string(), parse_base(base)?);
        }
        Ok(Self { bases })
    }

    /// Every service served from one base URL
    pub fn single(base: &str) -> Result<Self, ProviderError> {
        let base = parse_base(base)?;
        let bases = ["compute", "storage", "iam", "dns"]
            .into_iter()
            .map(|service| (service.to_string(), base.clone()))
            .collect();
        Ok(Self { bases })
    }

    /// Public endpoints unless an override is given
    pub fn resolve(api_endpoint: Option<&str>) -> Result<Self, ProviderError> {
        match api_endpoint {
            Some(base) => Self::single(base),
            None => Self::google(),
        }
    }

    /// Absolute URL for `path` on `service`
    pub fn url(&self, service: &str, path: &str) -> Result<Url, ProviderError> {
        let base = self
            .bases
            .get(service)
            .ok_or_else(|| ProviderError::UnknownService(service.to_string()))?;
        base.join(path.trim_start_matches('/'))
            .map_err(|e| ProviderError::Transport(format!("invalid URL for {}: {}", path, e)))
    }
}

fn parse_base(base: &str) -> Result<Url, ProviderError> {
    // A trailing slash keeps the last path segment when joining
    let normalized = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Url::parse(&normalized)
        .map_err(|e| ProviderError::Transport(format!("invalid API endpoint {}: {}", base, e)))
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub endpoints: Endpoints,
}

impl GcpClient {
    pub fn new(credentials: GcpCredentials, endpoints: Endpoints) -> Result<Self, ProviderError> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            endpoints,
        })
    }

    /// Make an authenticated GET request
    pub async fn get(&self, url: &Url) -> Result<Value, ProviderError> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }
}

#[async_trait]
impl Provider for GcpClient {
    async fn list(
        &self,
        request: &ListRequest,
        page_token: Option<&str>,
    ) -> Result<Page, ProviderError> {
        let mut url = self.endpoints.url(&request.service, &request.path)?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in &request.query {
                query.append_pair(name, value);
            }
            query.append_pair(&request.page_size_param, &request.page_size.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        let response = self.get(&url).await?;
        Ok(Page::from_response(&response, &request.items))
    }

    async fn describe(&self, request: &DescribeRequest) -> Result<Value, ProviderError> {
        let url = self.endpoints.url(&request.service, &request.path)?;
        self.get(&url).await
    }
}
