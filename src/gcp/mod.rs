//! GCP API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Access tokens and default project/region/zone discovery
//! - [`client`] - [`client::GcpClient`], the REST implementation of [`crate::Provider`]
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use gcp2tf::gcp::{auth::GcpCredentials, client::{Endpoints, GcpClient}};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let credentials = GcpCredentials::resolve(None).await?;
//!     let client = GcpClient::new(credentials, Endpoints::google()?)?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
