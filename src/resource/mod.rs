//! Resource abstraction layer
//!
//! Kinds are data: each one is a JSON definition (how to list it, which
//! fields to keep, how to enrich it) plus a block template, both embedded at
//! compile time. Adding a kind needs no code changes.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches kind definitions and templates
//! - [`mapper`] - Turns raw API items into records
//!
//! # Resource Definitions
//!
//! Definitions live under `src/resources/`, one file per family:
//! - `compute.json` - instances, disks
//! - `network.json` - networks, subnetworks, firewalls, routes
//! - `iam.json` - service accounts, custom roles
//! - `storage.json` - buckets
//! - `dns.json` - managed zones, record sets
//! - `lb.json` - health checks, backend services, forwarding rules
//! - `autoscaling.json` - instance templates, instance group managers, autoscalers
//!
//! # Example
//!
//! ```ignore
//! use gcp2tf::resource::find_resource;
//!
//! let def = find_resource("network", "firewalls").unwrap();
//! println!("{} -> {}", def.display_name, def.terraform_type);
//! ```

pub mod mapper;
mod registry;

pub use mapper::{is_excluded, lookup, map_collection, map_record, Mapped};
pub use registry::*;
