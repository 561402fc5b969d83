//! Raw API items to records
//!
//! Pure functions: no I/O, same input gives the same record.

use super::registry::{ExcludeDef, FieldDef, ResourceDef, Transform};
use crate::pipeline::helpers::short_name;
use crate::pipeline::model::{Field, ResourceCollection, ResourceRecord};
use serde_json::{json, Value};

/// Look up a dot-separated path, with numeric segments indexing arrays
pub fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = item;

    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(idx) if current.is_array() => current.get(idx)?,
            _ => current.get(part)?,
        };
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn transform(value: &Value, transform: Transform) -> Result<Value, String> {
    match transform {
        Transform::Value => Ok(value.clone()),
        Transform::ShortName => match value {
            Value::String(s) => Ok(Value::String(short_name(s))),
            other => Err(format!("expected a string, got {}", other)),
        },
        Transform::ShortNames => match value {
            Value::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => Value::String(short_name(s)),
                        other => other.clone(),
                    })
                    .collect(),
            )),
            other => Err(format!("expected a list, got {}", other)),
        },
        Transform::Entries => match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                Ok(Value::Array(
                    keys.into_iter()
                        .map(|k| json!({ "key": k, "value": map[k] }))
                        .collect(),
                ))
            }
            other => Err(format!("expected an object, got {}", other)),
        },
        Transform::LocalPart => match value {
            Value::String(s) => Ok(Value::String(
                s.split('@').next().unwrap_or(s.as_str()).to_string(),
            )),
            other => Err(format!("expected a string, got {}", other)),
        },
    }
}

/// Extract one field. Missing or null stays absent; an empty value stays present.
pub fn map_field(item: &Value, def: &FieldDef) -> Result<Field, String> {
    match lookup(item, &def.path) {
        None => Ok(Field::Absent),
        Some(value) => transform(value, def.transform)
            .map(Field::Present)
            .map_err(|e| format!("field {}: {}", def.name, e)),
    }
}

/// Extract every declared field, in declaration order
pub fn map_record(item: &Value, fields: &[FieldDef]) -> Result<ResourceRecord, String> {
    let mut record = ResourceRecord::new();
    for def in fields {
        record.set(&def.name, map_field(item, def)?);
    }
    Ok(record)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether an item matches any exclusion rule
pub fn is_excluded(item: &Value, rules: &[ExcludeDef]) -> bool {
    rules.iter().any(|rule| match lookup(item, &rule.field) {
        None => false,
        Some(_) if rule.values.is_empty() => true,
        Some(value) => {
            let text = value_text(value);
            rule.values.iter().any(|v| *v == text)
        }
    })
}

/// Result of mapping a whole listing
#[derive(Debug, Default)]
pub struct Mapped {
    pub collection: ResourceCollection,
    pub excluded: usize,
    /// Items that could not be mapped, as `(key, message)`
    pub failures: Vec<(String, String)>,
}

/// Map raw items in order, dropping excluded ones
pub fn map_collection(def: &ResourceDef, items: &[Value]) -> Mapped {
    let mut mapped = Mapped::default();

    for (idx, item) in items.iter().enumerate() {
        if is_excluded(item, &def.exclude) {
            mapped.excluded += 1;
            continue;
        }

        match map_record(item, &def.fields) {
            Ok(record) => mapped.collection.push(record),
            Err(message) => {
                let key = lookup(item, "name")
                    .map(value_text)
                    .unwrap_or_else(|| format!("#{}", idx));
                tracing::warn!("{}: skipping {}: {}", def.key, key, message);
                mapped.failures.push((key, message));
            }
        }
    }

    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::get_resource;

    fn field(name: &str, path: &str, transform: Transform) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            path: path.to_string(),
            transform,
        }
    }

    #[test]
    fn test_lookup_paths() {
        let item = json!({"a": {"b": [{"c": 1}, {"c": 2}]}, "n": null});
        assert_eq!(lookup(&item, "a.b.1.c"), Some(&json!(2)));
        assert_eq!(lookup(&item, "a.x"), None);
        assert_eq!(lookup(&item, "a.b.9.c"), None);
        assert_eq!(lookup(&item, "n"), None);
    }

    #[test]
    fn test_absent_versus_empty() {
        let item = json!({"description": "", "labels": {}, "gone": null});
        assert_eq!(
            map_field(&item, &field("d", "description", Transform::Value)).unwrap(),
            Field::Present(json!(""))
        );
        assert_eq!(
            map_field(&item, &field("l", "labels", Transform::Entries)).unwrap(),
            Field::Present(json!([]))
        );
        assert!(map_field(&item, &field("g", "gone", Transform::Value))
            .unwrap()
            .is_absent());
        assert!(map_field(&item, &field("m", "missing", Transform::Value))
            .unwrap()
            .is_absent());
    }

    #[test]
    fn test_transforms() {
        let item = json!({
            "zone": "https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-a",
            "targets": ["projects/p/global/a", "projects/p/global/b"],
            "labels": {"team": "infra", "env": "prod"},
            "email": "robot@p.iam.gserviceaccount.com"
        });

        let zone = map_field(&item, &field("zone", "zone", Transform::ShortName)).unwrap();
        assert_eq!(zone.as_str(), Some("us-central1-a"));

        let targets = map_field(&item, &field("t", "targets", Transform::ShortNames)).unwrap();
        assert_eq!(targets.value(), Some(&json!(["a", "b"])));

        let labels = map_field(&item, &field("l", "labels", Transform::Entries)).unwrap();
        assert_eq!(
            labels.value(),
            Some(&json!([
                {"key": "env", "value": "prod"},
                {"key": "team", "value": "infra"}
            ]))
        );

        let id = map_field(&item, &field("id", "email", Transform::LocalPart)).unwrap();
        assert_eq!(id.as_str(), Some("robot"));
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let item = json!({"zone": 5});
        assert!(map_field(&item, &field("zone", "zone", Transform::ShortName)).is_err());
    }

    #[test]
    fn test_exclusion_rules() {
        let rules = vec![
            ExcludeDef {
                field: "type".to_string(),
                values: vec!["SOA".to_string(), "NS".to_string()],
            },
            ExcludeDef {
                field: "region".to_string(),
                values: Vec::new(),
            },
        ];
        assert!(is_excluded(&json!({"type": "SOA"}), &rules));
        assert!(is_excluded(&json!({"type": "A", "region": "r"}), &rules));
        assert!(!is_excluded(&json!({"type": "A"}), &rules));
    }

    #[test]
    fn test_map_collection_keeps_order_and_counts_exclusions() {
        let def = get_resource("dns-record-sets").unwrap();
        let items = vec![
            json!({"name": "example.com.", "type": "SOA", "ttl": 21600}),
            json!({"name": "b.example.com.", "type": "A", "ttl": 300, "rrdatas": ["10.0.0.2"]}),
            json!({"name": "a.example.com.", "type": "A", "ttl": 300, "rrdatas": ["10.0.0.1"]}),
        ];

        let mapped = map_collection(def, &items);
        assert_eq!(mapped.excluded, 1);
        let names: Vec<String> = mapped.collection.iter().map(|r| r.key("name")).collect();
        assert_eq!(names, vec!["b.example.com.", "a.example.com."]);
    }
}
