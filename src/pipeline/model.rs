//! Intermediate resource model
//!
//! A [`ResourceRecord`] is an ordered list of named [`Field`]s. A field is either
//! [`Field::Absent`] (the provider did not report it) or [`Field::Present`]
//! (reported, possibly as an empty string, list or map). Only present fields
//! reach the template engine.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Tri-state scalar: absent, or present with a possibly empty value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field {
    #[default]
    Absent,
    Present(Value),
}

static ABSENT: Field = Field::Absent;

impl Field {
    /// Map an optional JSON value; `null` counts as absent
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Field::Absent,
            Some(v) => Field::Present(v.clone()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// Present but carrying an empty string, list or map
    pub fn is_empty(&self) -> bool {
        match self {
            Field::Present(Value::String(s)) => s.is_empty(),
            Field::Present(Value::Array(a)) => a.is_empty(),
            Field::Present(Value::Object(o)) => o.is_empty(),
            _ => false,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value().and_then(|v| v.as_str())
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::from_json(Some(&value))
    }
}

/// One discovered resource
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceRecord {
    fields: Vec<(String, Field)>,
}

impl ResourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping its original position if it already exists
    pub fn set(&mut self, name: &str, field: Field) {
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = field;
        } else {
            self.fields.push((name.to_string(), field));
        }
    }

    /// Builder-style [`ResourceRecord::set`]
    pub fn with(mut self, name: &str, field: Field) -> Self {
        self.set(name, field);
        self
    }

    /// Look up a field; unknown names are absent
    pub fn get(&self, name: &str) -> &Field {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
            .unwrap_or(&ABSENT)
    }

    /// Fields in record order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    /// Whether any of the given fields is present
    pub fn has_any_present<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.get(n.as_ref()).is_present())
    }

    /// Fold another record into this one; present fields of `other` win
    pub fn merge(&mut self, other: ResourceRecord) {
        for (name, field) in other.fields {
            if field.is_present() || self.get(&name).is_absent() {
                self.set(&name, field);
            }
        }
    }

    /// Stable identity used in logs and enrichment keys
    pub fn key(&self, field: &str) -> String {
        match self.get(field).value() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

// Absent fields are skipped entirely, so templates never see them
impl Serialize for ResourceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<_> = self
            .fields
            .iter()
            .filter_map(|(n, f)| f.value().map(|v| (n, v)))
            .collect();

        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (name, value) in present {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ordered records of one resource kind, in provider page order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceCollection {
    records: Vec<ResourceRecord>,
}

impl ResourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResourceRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<ResourceRecord> {
        self.records
    }
}

impl From<Vec<ResourceRecord>> for ResourceCollection {
    fn from(records: Vec<ResourceRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<ResourceRecord> for ResourceCollection {
    fn from_iter<I: IntoIterator<Item = ResourceRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ResourceCollection {
    type Item = ResourceRecord;
    type IntoIter = std::vec::IntoIter<ResourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResourceCollection {
    type Item = &'a ResourceRecord;
    type IntoIter = std::slice::Iter<'a, ResourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
