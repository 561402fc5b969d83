//! Resource Registry - Load resource kind definitions from JSON
//!
//! Every exportable kind is described by an embedded JSON definition and an
//! embedded Tera block template, so new kinds need no code changes.

use crate::error::{ExportError, RenderError};
use crate::pipeline::render::TemplateSpec;
use crate::pipeline::Scope;
use crate::provider::{DescribeRequest, ItemsPath, ListRequest};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/compute.json"),
    include_str!("../resources/network.json"),
    include_str!("../resources/iam.json"),
    include_str!("../resources/storage.json"),
    include_str!("../resources/dns.json"),
    include_str!("../resources/lb.json"),
    include_str!("../resources/autoscaling.json"),
];

/// Embedded block templates, by name
const TEMPLATE_FILES: &[(&str, &str)] = &[
    ("compute_instance", include_str!("../templates/compute_instance.tf.tera")),
    ("compute_disk", include_str!("../templates/compute_disk.tf.tera")),
    ("compute_network", include_str!("../templates/compute_network.tf.tera")),
    ("compute_subnetwork", include_str!("../templates/compute_subnetwork.tf.tera")),
    ("compute_firewall", include_str!("../templates/compute_firewall.tf.tera")),
    ("compute_route", include_str!("../templates/compute_route.tf.tera")),
    ("service_account", include_str!("../templates/service_account.tf.tera")),
    ("project_iam_custom_role", include_str!("../templates/project_iam_custom_role.tf.tera")),
    ("storage_bucket", include_str!("../templates/storage_bucket.tf.tera")),
    ("dns_managed_zone", include_str!("../templates/dns_managed_zone.tf.tera")),
    ("dns_record_set", include_str!("../templates/dns_record_set.tf.tera")),
    ("compute_health_check", include_str!("../templates/compute_health_check.tf.tera")),
    ("compute_backend_service", include_str!("../templates/compute_backend_service.tf.tera")),
    ("compute_global_forwarding_rule", include_str!("../templates/compute_global_forwarding_rule.tf.tera")),
    ("compute_instance_group_manager", include_str!("../templates/compute_instance_group_manager.tf.tera")),
    ("compute_autoscaler", include_str!("../templates/compute_autoscaler.tf.tera")),
    ("compute_instance_template", include_str!("../templates/compute_instance_template.tf.tera")),
];

/// How a raw JSON value is turned into a field value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Keep the value as reported
    #[default]
    Value,
    /// Last segment of a resource URL
    ShortName,
    /// `short_name` applied to every element of a list
    ShortNames,
    /// Object turned into a key-sorted list of `{key, value}` pairs
    Entries,
    /// Text before the `@` of an email address
    LocalPart,
}

/// Field definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// Dot-separated path into the API item
    pub path: String,
    #[serde(default)]
    pub transform: Transform,
}

/// Items to drop before mapping
#[derive(Debug, Clone, Deserialize)]
pub struct ExcludeDef {
    /// Dot-separated path into the API item
    pub field: String,
    /// Matching values; empty means "drop whenever the field is present"
    #[serde(default)]
    pub values: Vec<String>,
}

/// List call definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ListDef {
    pub path: String,
    /// Path to the items array in a plain list response
    #[serde(default)]
    pub items: Option<String>,
    /// Per-scope key in an aggregated list response
    #[serde(default)]
    pub aggregated: Option<String>,
    #[serde(default = "default_page_size_param")]
    pub page_size_param: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

fn default_page_size_param() -> String {
    "maxResults".to_string()
}

/// Secondary per-item call used to enrich records
#[derive(Debug, Clone, Deserialize)]
pub struct DetailDef {
    pub service: String,
    /// Path template; `{key}` is the record's id field
    pub path: String,
    pub fields: Vec<FieldDef>,
}

impl DetailDef {
    /// Detail request for one record
    pub fn describe_request(&self, scope: &Scope, key: &str) -> Result<DescribeRequest, String> {
        let path = expand_path(&self.path, |name| {
            if name == "key" {
                Some(key.to_string())
            } else {
                scope.lookup(name)
            }
        })?;

        Ok(DescribeRequest {
            service: self.service.clone(),
            path,
        })
    }
}

/// Resource kind definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    /// Registry key, filled in from the JSON map key
    #[serde(skip)]
    pub key: String,
    pub display_name: String,
    pub family: String,
    pub command: String,
    pub terraform_type: String,
    pub service: String,
    pub list: ListDef,
    pub id_field: String,
    /// Fields joined with `-` to build the block label
    pub label_fields: Vec<String>,
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub exclude: Vec<ExcludeDef>,
    #[serde(default)]
    pub detail: Option<DetailDef>,
    pub template: String,
    #[serde(default)]
    pub import_id: Option<String>,
    /// Scope parameters the command must supply, e.g. `managed_zone`
    #[serde(default)]
    pub params: Vec<String>,
}

impl ResourceDef {
    /// Names of every field a record of this kind may carry
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        if let Some(detail) = &self.detail {
            for field in &detail.fields {
                if !names.contains(&field.name) {
                    names.push(field.name.clone());
                }
            }
        }
        names
    }

    /// List request for this kind within `scope`
    pub fn list_request(&self, scope: &Scope, page_size: u32) -> Result<ListRequest, ExportError> {
        let lookup = |name: &str| scope.lookup(name);
        let path = expand_path(&self.list.path, lookup)
            .map_err(|e| ExportError::Config(format!("{}: {}", self.key, e)))?;

        let mut query = Vec::new();
        for (param, value) in &self.list.query {
            let value = expand_raw(value, lookup)
                .map_err(|e| ExportError::Config(format!("{}: {}", self.key, e)))?;
            query.push((param.clone(), value));
        }

        let items = match (&self.list.aggregated, &self.list.items) {
            (Some(key), _) => ItemsPath::Aggregated(key.clone()),
            (None, Some(path)) => ItemsPath::Field(path.clone()),
            (None, None) => ItemsPath::Field("items".to_string()),
        };

        Ok(ListRequest {
            kind: self.key.clone(),
            service: self.service.clone(),
            path,
            query,
            items,
            page_size,
            page_size_param: self.list.page_size_param.clone(),
        })
    }

    /// Template registration for this kind
    pub fn template_spec(&self) -> Result<TemplateSpec, RenderError> {
        let body = get_template_source(&self.template)
            .ok_or_else(|| RenderError::UnknownTemplate(self.template.clone()))?;

        Ok(TemplateSpec {
            name: self.key.clone(),
            body: body.to_string(),
            terraform_type: self.terraform_type.clone(),
            fields: self.field_names(),
            label_fields: self.label_fields.clone(),
            import_id: self.import_id.clone(),
        })
    }
}

/// Substitute `{name}` (URL-encoded) and `{+name}` (verbatim) placeholders
pub fn expand_path<F>(template: &str, lookup: F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    expand(template, lookup, true)
}

/// Substitute placeholders without any encoding
pub fn expand_raw<F>(template: &str, lookup: F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    expand(template, lookup, false)
}

fn expand<F>(template: &str, lookup: F, encode: bool) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            return Err(format!("unterminated placeholder in {:?}", template));
        };

        let placeholder = &after[..end];
        let (name, verbatim) = match placeholder.strip_prefix('+') {
            Some(name) => (name, true),
            None => (placeholder, false),
        };

        let value = lookup(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("no value for placeholder {{{}}}", name))?;

        if encode && !verbatim {
            out.push_str(&urlencoding::encode(&value));
        } else {
            out.push_str(&value);
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            for (key, mut def) in partial.resources {
                def.key = key.clone();
                final_config.resources.insert(key, def);
            }
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Find the kind behind `<family> <command>`
pub fn find_resource(family: &str, command: &str) -> Option<&'static ResourceDef> {
    get_registry()
        .resources
        .values()
        .find(|def| def.family == family && def.command == command)
}

/// Get all resource keys, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}

/// All definitions in key order
pub fn all_resources() -> Vec<&'static ResourceDef> {
    get_all_resource_keys()
        .into_iter()
        .filter_map(get_resource)
        .collect()
}

/// Get an embedded template source by name
pub fn get_template_source(name: &str) -> Option<&'static str> {
    TEMPLATE_FILES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, body)| *body)
}
