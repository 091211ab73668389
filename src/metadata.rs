//! Metadata extraction over a whole rule table

use scraper::Html;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::rules::engine::evaluate_named;
use crate::rules::{builtin_rule_sets, Context, FieldValue, RuleSetTable};

/// Extracted fields in table order. Fields that resolved to nothing are
/// kept with a `None` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    fields: Vec<(String, Option<FieldValue>)>,
}

impl MetadataRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Text value of `field`, if it resolved to text
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    /// List value of `field`, if it resolved to a list
    pub fn list(&self, field: &str) -> Option<&[String]> {
        self.get(field).and_then(FieldValue::as_list)
    }

    /// Whether `field` was evaluated at all (it may still be absent)
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON object with `null` for absent fields, keys in table order
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.fields {
            let json = match value {
                Some(FieldValue::Text(s)) => Value::String(s.clone()),
                Some(FieldValue::List(items)) => {
                    Value::Array(items.iter().cloned().map(Value::String).collect())
                }
                None => Value::Null,
            };
            map.insert(name.clone(), json);
        }
        Value::Object(map)
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Extract every field of `rule_sets` (the built-in table when `None`)
pub fn extract_metadata(
    document: &Html,
    url: &str,
    rule_sets: Option<&RuleSetTable>,
) -> Result<MetadataRecord> {
    let rule_sets = match rule_sets {
        Some(table) => table,
        None => builtin_rule_sets(),
    };
    let context = Context::new(url);

    let mut record = MetadataRecord::default();
    for (name, rule_set) in rule_sets.iter() {
        let value = evaluate_named(name, rule_set, document, &context)?;
        record.fields.push((name.to_string(), value));
    }

    debug!(
        "Extracted {} of {} fields for {}",
        record.fields.iter().filter(|(_, v)| v.is_some()).count(),
        record.fields.len(),
        url
    );
    Ok(record)
}

/// Parse `html` and extract metadata from it
pub fn extract_metadata_from_html(
    html: &str,
    url: &str,
    rule_sets: Option<&RuleSetTable>,
) -> Result<MetadataRecord> {
    let document = Html::parse_document(html);
    extract_metadata(&document, url, rule_sets)
}
