//! gcp2tf
//!
//! Inspects a live GCP project through its REST APIs and reconstructs Terraform
//! configuration that reproduces the discovered resources.
//!
//! # Module Structure
//!
//! - [`gcp`] - Authentication, HTTP plumbing and the [`Provider`] implementation
//! - [`resource`] - Data-driven resource kind catalogue and JSON-to-record mapping
//! - [`pipeline`] - Pagination, bounded enrichment, rendering and canonical formatting
//! - [`config`] - Persistent configuration and pipeline settings
//! - [`error`] - Error taxonomy shared by every stage

pub mod config;
pub mod error;
pub mod gcp;
pub mod pipeline;
pub mod provider;
pub mod resource;

pub use error::{EnrichmentError, ExportError, FormatError, RenderError};
pub use pipeline::{ExportReport, PipelineContext, Scope};
pub use provider::{DescribeRequest, ItemsPath, ListRequest, Page, Provider, ProviderError};
