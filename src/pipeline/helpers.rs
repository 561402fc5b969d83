//! Template helpers
//!
//! Pure, total functions over already-extracted values, exposed to templates
//! as Tera filters through [`HelperRegistry`].

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Tera filter signature
pub type HelperFn = fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>;

/// Built-in Tera filters templates may use alongside the registered helpers
pub const ALLOWED_BUILTIN_FILTERS: &[&str] = &[
    "default", "first", "join", "last", "length", "lower", "replace", "sort", "trim", "upper",
];

/// Render a string as an HCL quoted literal
pub fn quote_hcl(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + 2);
    out.push('"');

    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Template markers must be doubled to stay literal
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }

    out.push('"');
    out
}

/// Turn an arbitrary identifier into a valid Terraform resource name
pub fn resource_name(src: &str) -> String {
    let mut out: String = src
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    match out.chars().next() {
        None => out.push('_'),
        Some(c) if c.is_ascii_digit() || c == '-' => out.insert(0, '_'),
        _ => {}
    }

    out
}

/// Last path segment of a resource URL
pub fn short_name(src: &str) -> String {
    src.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(src)
        .to_string()
}

/// Stringify a scalar for quoting. Strings are taken verbatim, everything else as JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn list_items(value: &Value, helper: &str) -> tera::Result<Vec<String>> {
    match value {
        Value::Array(items) => Ok(items.iter().map(scalar_text).collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(tera::Error::msg(format!(
            "`{}` expects a list, got {}",
            helper, other
        ))),
    }
}

fn quote_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(quote_hcl(&scalar_text(value))))
}

fn join_quoted_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let sep = args.get("sep").and_then(|v| v.as_str()).unwrap_or(",");
    let quoted: Vec<String> = list_items(value, "join_quoted")?
        .iter()
        .map(|s| quote_hcl(s))
        .collect();
    Ok(Value::String(quoted.join(sep)))
}

fn hcl_list_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let quoted: Vec<String> = list_items(value, "hcl_list")?
        .iter()
        .map(|s| quote_hcl(s))
        .collect();
    Ok(Value::String(format!("[{}]", quoted.join(", "))))
}

fn resource_name_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(resource_name(&scalar_text(value))))
}

fn short_name_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(short_name(&scalar_text(value))))
}

/// Named helpers available to templates
#[derive(Clone)]
pub struct HelperRegistry {
    helpers: BTreeMap<&'static str, HelperFn>,
}

impl HelperRegistry {
    /// Registry with no helpers at all
    pub fn empty() -> Self {
        Self {
            helpers: BTreeMap::new(),
        }
    }

    /// The helpers every shipped template relies on
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("quote", quote_filter);
        registry.register("join_quoted", join_quoted_filter);
        registry.register("hcl_list", hcl_list_filter);
        registry.register("resource_name", resource_name_filter);
        registry.register("short_name", short_name_filter);
        registry
    }

    pub fn register(&mut self, name: &'static str, helper: HelperFn) {
        self.helpers.insert(name, helper);
    }

    /// Whether templates may use `name` as a filter
    pub fn allows(&self, name: &str) -> bool {
        self.helpers.contains_key(name) || ALLOWED_BUILTIN_FILTERS.contains(&name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.helpers.keys().copied()
    }

    /// Install every helper into a Tera instance
    pub fn install(&self, tera: &mut tera::Tera) {
        for (name, helper) in &self.helpers {
            tera.register_filter(name, *helper);
        }
    }
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
