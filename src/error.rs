//! Error taxonomy
//!
//! Every fatal kind propagates unchanged to the binary, which prints it and
//! exits non-zero. [`EnrichmentError`] is the only per-item kind: it travels
//! inside enrichment results and ends up in the export report.

use crate::provider::ProviderError;
use thiserror::Error;

/// Fatal failure of a resource-kind export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to list {kind}: {source}")]
    Fetch {
        kind: String,
        #[source]
        source: ProviderError,
    },

    #[error("pagination for {kind} stalled: continuation token {token:?} was returned twice (page {page})")]
    StalePagination {
        kind: String,
        token: String,
        page: usize,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("credentials unavailable: {0}")]
    Credential(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("export of {0} was cancelled")]
    Cancelled(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// User-facing hint for provider failures, if any
    pub fn hint(&self) -> Option<String> {
        match self {
            ExportError::Fetch { source, .. } => Some(source.user_message()),
            _ => None,
        }
    }
}

/// Per-item failure attached to a single enrichment result
#[derive(Debug, Clone, Error)]
pub enum EnrichmentError {
    #[error("describe {key} failed: {source}")]
    Provider {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("could not map details of {key}: {message}")]
    Mapping { key: String, message: String },

    #[error("enrichment of {key} was cancelled before it started")]
    Cancelled { key: String },

    #[error("worker enriching {key} stopped without reporting")]
    Panicked { key: String },
}

impl EnrichmentError {
    /// Enrichment key of the job that failed
    pub fn key(&self) -> &str {
        match self {
            EnrichmentError::Provider { key, .. }
            | EnrichmentError::Mapping { key, .. }
            | EnrichmentError::Cancelled { key }
            | EnrichmentError::Panicked { key } => key,
        }
    }
}

/// Template configuration or rendering failure. Raised before any output is written.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("template {template} uses undefined helper `{helper}`")]
    UndefinedHelper { template: String, helper: String },

    #[error("template {template} references undefined field `record.{field}`")]
    UndefinedField { template: String, field: String },

    #[error("template {template} failed: {message}")]
    Template { template: String, message: String },
}

/// Canonicalization failure on generated text
#[derive(Debug, Clone, Error)]
#[error("generated configuration does not parse{}: {message}", location_suffix(.line, .column))]
pub struct FormatError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
    /// The draft text that failed to parse
    pub draft: String,
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(l), Some(c)) => format!(" at line {}, column {}", l, c),
        (Some(l), None) => format!(" at line {}", l),
        _ => String::new(),
    }
}
