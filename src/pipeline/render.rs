//! Template renderer
//!
//! Templates are Tera sources rendered once per record. They are validated
//! when registered, before any API call: the source must parse, every filter
//! must be a known helper and every `record.<field>` must be declared by the
//! kind. Rendering happens fully in memory, so a failure never leaves partial
//! output behind.
//!
//! The static checks scan tag text with regular expressions. Both
//! `record.<field>` and `record["field"]` references are checked; an index
//! computed from a variable is left to Tera at render time. String literals
//! are blanked before the filter scan, so a `|` in a literal is not taken
//! for a filter.
//!
//! Block labels are unique per Terraform type within one render call. A
//! repeated label gets a `-2`, `-3`, ... suffix in record order. This covers
//! the primary block of each record and any extra `resource` blocks a
//! template emits after it.

use super::helpers::{resource_name, HelperRegistry};
use super::model::{ResourceCollection, ResourceRecord};
use super::Scope;
use crate::error::RenderError;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use tera::Tera;

/// A block template and the fields it is allowed to reference
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub name: String,
    pub body: String,
    /// Terraform resource type, used for import addresses
    pub terraform_type: String,
    pub fields: Vec<String>,
    /// Fields whose values, joined with `-` and sanitized, become the block label
    pub label_fields: Vec<String>,
    /// Optional Tera expression producing the `terraform import` id
    pub import_id: Option<String>,
}

/// Everything one render call needs. Borrowed, consumed once, then discarded.
pub struct RenderContext<'a> {
    pub collection: &'a ResourceCollection,
    pub template: &'a str,
    pub scope: &'a Scope,
}

/// Draft text plus bookkeeping
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub text: String,
    pub rendered: usize,
    /// Records with no present field relevant to the template
    pub skipped_empty: usize,
    pub imports: Vec<String>,
}

pub struct TemplateRenderer {
    tera: Tera,
    helpers: HelperRegistry,
    specs: HashMap<String, TemplateSpec>,
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").expect("static regex"))
}

fn filter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\|\s*([A-Za-z_][A-Za-z0-9_]*)").expect("static regex"))
}

fn string_literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""(?:[^"\\]|\\.)*"|'[^']*'|`[^`]*`"#).expect("static regex")
    })
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^resource\s+"([^"]+)"\s+"([^"]+)""#).expect("static regex")
    })
}

fn index_field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\brecord\[\s*["']([^"']+)["']\s*\]"#).expect("static regex")
    })
}

fn field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\brecord\.([A-Za-z_][A-Za-z0-9_]*)").expect("static regex"))
}

/// Flatten a Tera error and its causes into one line
fn describe_tera_error(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

/// Terraform block label for a record
fn block_label(record: &ResourceRecord, label_fields: &[String]) -> String {
    let parts: Vec<String> = label_fields
        .iter()
        .map(|field| record.key(field))
        .filter(|part| !part.is_empty())
        .collect();
    resource_name(&parts.join("-"))
}

/// Hands out block labels that are unique per Terraform type
#[derive(Debug, Default)]
struct LabelAllocator {
    taken: HashSet<(String, String)>,
}

impl LabelAllocator {
    fn allocate(&mut self, terraform_type: &str, base: &str) -> String {
        let mut label = base.to_string();
        let mut n = 1;
        while self.taken.contains(&(terraform_type.to_string(), label.clone())) {
            n += 1;
            label = format!("{}-{}", base, n);
        }
        self.taken.insert((terraform_type.to_string(), label.clone()));
        label
    }

    /// Relabel repeated headers among the blocks following the primary one
    fn relabel_extra(&mut self, block: &str) -> String {
        let mut out = String::with_capacity(block.len());
        let mut last = 0;

        for cap in header_regex().captures_iter(block).skip(1) {
            let (Some(terraform_type), Some(label)) = (cap.get(1), cap.get(2)) else {
                continue;
            };
            let unique = self.allocate(terraform_type.as_str(), label.as_str());
            if unique != label.as_str() {
                out.push_str(&block[last..label.start()]);
                out.push_str(&unique);
                last = label.end();
            }
        }

        out.push_str(&block[last..]);
        out
    }
}

fn import_template_name(name: &str) -> String {
    format!("{}#import", name)
}

impl TemplateRenderer {
    pub fn new(helpers: HelperRegistry) -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        helpers.install(&mut tera);

        Self {
            tera,
            helpers,
            specs: HashMap::new(),
        }
    }

    /// Validate and register a template
    pub fn register(&mut self, spec: TemplateSpec) -> Result<(), RenderError> {
        self.validate(&spec.name, &spec.body, &spec.fields)?;
        self.tera
            .add_raw_template(&spec.name, &spec.body)
            .map_err(|e| RenderError::Template {
                template: spec.name.clone(),
                message: describe_tera_error(&e),
            })?;

        if let Some(import_id) = &spec.import_id {
            let name = import_template_name(&spec.name);
            self.validate(&name, import_id, &spec.fields)?;
            self.tera
                .add_raw_template(&name, import_id)
                .map_err(|e| RenderError::Template {
                    template: name.clone(),
                    message: describe_tera_error(&e),
                })?;
        }

        tracing::debug!("registered template {}", spec.name);
        self.specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Static checks on helper and field references
    fn validate(&self, name: &str, body: &str, fields: &[String]) -> Result<(), RenderError> {
        for tag in tag_regex().find_iter(body) {
            let raw = tag.as_str();
            let tag = string_literal_regex().replace_all(raw, "\"\"");

            let dotted = field_regex().captures_iter(&tag);
            let indexed = index_field_regex().captures_iter(raw);
            for cap in dotted.chain(indexed) {
                let field = &cap[1];
                if !fields.iter().any(|f| f == field) {
                    return Err(RenderError::UndefinedField {
                        template: name.to_string(),
                        field: field.to_string(),
                    });
                }
            }

            for cap in filter_regex().captures_iter(&tag) {
                let helper = &cap[1];
                if !self.helpers.allows(helper) {
                    return Err(RenderError::UndefinedHelper {
                        template: name.to_string(),
                        helper: helper.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Render every relevant record of the collection, in collection order
    pub fn render(&self, ctx: &RenderContext<'_>) -> Result<Rendered, RenderError> {
        let spec = self
            .specs
            .get(ctx.template)
            .ok_or_else(|| RenderError::UnknownTemplate(ctx.template.to_string()))?;

        let mut out = Rendered::default();
        let mut blocks: Vec<String> = Vec::new();
        let mut labels = LabelAllocator::default();

        for record in ctx.collection {
            if !record.has_any_present(&spec.fields) {
                out.skipped_empty += 1;
                continue;
            }

            let label = labels.allocate(
                &spec.terraform_type,
                &block_label(record, &spec.label_fields),
            );
            let mut context = tera::Context::new();
            context.insert("record", record);
            context.insert("label", &label);
            context.insert("scope", ctx.scope);

            let block = self
                .tera
                .render(&spec.name, &context)
                .map_err(|e| RenderError::Template {
                    template: spec.name.clone(),
                    message: describe_tera_error(&e),
                })?;
            blocks.push(labels.relabel_extra(block.trim()));

            if spec.import_id.is_some() {
                let name = import_template_name(&spec.name);
                let id = self
                    .tera
                    .render(&name, &context)
                    .map_err(|e| RenderError::Template {
                        template: name.clone(),
                        message: describe_tera_error(&e),
                    })?;
                out.imports.push(format!(
                    "terraform import {}.{} {}",
                    spec.terraform_type,
                    label,
                    id.trim()
                ));
            }

            out.rendered += 1;
        }

        out.text = blocks.join("\n\n");
        if !out.text.is_empty() {
            out.text.push('\n');
        }
        Ok(out)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(HelperRegistry::standard())
    }
}
