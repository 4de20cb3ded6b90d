// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::RecordId;

const ID_FIELDS: [&str; 2] = ["_id", "id"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(OffsetDateTime),
}

impl FieldValue {
    /// String form used for search matching and as the fallback cell text.
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
            Self::Date(value) => value
                .format(&Rfc3339)
                .unwrap_or_else(|_| value.to_string()),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => Self::Number(number.as_f64().unwrap_or_default()),
            Value::String(text) => Self::Text(text.clone()),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Text(nested.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<OffsetDateTime> for FieldValue {
    fn from(value: OffsetDateTime) -> Self {
        Self::Date(value)
    }
}

/// One row of admin data: an id plus the document's fields in the order the
/// backend sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_owned(), value)),
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// `needle` must already be lowercased.
    pub fn any_field_contains(&self, needle: &str) -> bool {
        self.fields()
            .any(|(_, value)| value.display().to_lowercase().contains(needle))
    }

    /// Builds a record from one JSON document. The id comes from `_id`
    /// (plain or `{"$oid": ..}`) and falls back to `id`; every top-level key,
    /// id included, becomes a field.
    pub fn from_json(document: &Value) -> Result<Self> {
        let Value::Object(map) = document else {
            bail!("expected a JSON object per record, got {}", json_kind(document));
        };

        let id = ID_FIELDS
            .iter()
            .find_map(|key| map.get(*key).and_then(id_from_json))
            .ok_or_else(|| anyhow!("record has no usable `_id` or `id` field"))?;

        let fields = map
            .iter()
            .map(|(name, value)| {
                let value = match (name.as_str(), value) {
                    ("_id", Value::Object(_)) => FieldValue::Text(id.clone()),
                    _ => FieldValue::from_json(value),
                };
                (name.clone(), value)
            })
            .collect();

        Ok(Self {
            id: RecordId::new(id),
            fields,
        })
    }
}

fn id_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        _ => None,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, Record};
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn from_json_reads_mongo_object_id() -> Result<()> {
        let record = Record::from_json(&json!({
            "_id": {"$oid": "65f0c0ffee"},
            "name": "Amethyst Geode",
            "stock": 12,
        }))?;
        assert_eq!(record.id().as_str(), "65f0c0ffee");
        assert_eq!(
            record.get("_id"),
            Some(&FieldValue::Text("65f0c0ffee".to_owned()))
        );
        assert_eq!(record.get("stock"), Some(&FieldValue::Number(12.0)));
        Ok(())
    }

    #[test]
    fn from_json_falls_back_to_plain_id() -> Result<()> {
        let record = Record::from_json(&json!({"id": 7, "name": "Quartz"}))?;
        assert_eq!(record.id().as_str(), "7");
        Ok(())
    }

    #[test]
    fn from_json_rejects_documents_without_id() {
        let error = Record::from_json(&json!({"name": "Citrine"}))
            .expect_err("missing id should fail");
        assert!(error.to_string().contains("`_id`"));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let error = Record::from_json(&json!(["u1"])).expect_err("array should fail");
        assert!(error.to_string().contains("an array"));
    }

    #[test]
    fn nested_values_are_kept_as_json_text() -> Result<()> {
        let record = Record::from_json(&json!({
            "_id": "o1",
            "items": [{"sku": "AMT-01"}],
        }))?;
        assert!(record.any_field_contains("amt-01"));
        Ok(())
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(FieldValue::Number(30.0).display(), "30");
        assert_eq!(FieldValue::Number(12.5).display(), "12.5");
        assert_eq!(FieldValue::Null.display(), "");
    }

    #[test]
    fn set_replaces_existing_field_in_place() {
        let mut record = Record::new("u1").with_field("name", "Bob").with_field("age", 30_i64);
        record.set("name", "Robert");
        let names: Vec<&str> = record.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(
            record.get("name"),
            Some(&FieldValue::Text("Robert".to_owned()))
        );
    }
}
