//! Rule tables as JSON
//!
//! Lets callers ship field definitions as data instead of code:
//!
//! ```json
//! {
//!   "extend_builtin": true,
//!   "fields": [{
//!     "name": "author",
//!     "rules": [
//!       { "selector": "meta[name=\"author\"]", "accessor": "attr:content" },
//!       { "selector": ".byline", "accessor": "text" }
//!     ],
//!     "default": { "literal": "unknown" },
//!     "processors": ["trim"]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, Result};
use crate::rules::{
    absolute_url_processor, default_rule_sets, icon_size_score, FieldRuleSet, Processor,
    RuleEntry, RuleSetTable, DEFAULT_FAVICON,
};
use crate::transforms::{primary_language, provider_from_url, split_commas};

/// A whole table of field definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetConfig {
    pub fields: Vec<FieldConfig>,
    /// Start from the built-in table, overriding fields with the same name
    #[serde(default)]
    pub extend_builtin: bool,
}

/// One field definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub rules: Vec<RuleConfig>,
    /// Scorer names: `sizes`
    #[serde(default)]
    pub scorers: Vec<String>,
    #[serde(default)]
    pub default: Option<DefaultConfig>,
    /// Processor names: absolute_url, split_commas, primary_language,
    /// lowercase, uppercase, trim
    #[serde(default)]
    pub processors: Vec<String>,
}

/// Selector plus accessor: `text`, `html`, `inner_html` or `attr:<name>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub selector: String,
    #[serde(default)]
    pub accessor: Option<String>,
}

/// Fallback value: `url`, `favicon`, `provider` or a literal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultConfig {
    Named(String),
    Literal { literal: String },
}

impl RuleSetConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build and validate the table
    pub fn build(&self) -> Result<RuleSetTable> {
        let mut custom = RuleSetTable::new();
        for field in &self.fields {
            custom.try_add(field.name.clone(), field.build()?)?;
        }

        let table = if self.extend_builtin {
            let mut table = default_rule_sets();
            for (name, rule_set) in custom.iter() {
                table.insert(name, rule_set.clone());
            }
            table
        } else {
            custom
        };

        table.validate()?;
        Ok(table)
    }
}

impl FieldConfig {
    pub fn build(&self) -> Result<FieldRuleSet> {
        let rules = self
            .rules
            .iter()
            .map(RuleConfig::build)
            .collect::<Result<Vec<_>>>()?;
        let mut rule_set = FieldRuleSet::new(rules);

        for scorer in &self.scorers {
            rule_set = match scorer.as_str() {
                "sizes" => rule_set.with_scorer(icon_size_score),
                other => return Err(MetadataError::UnknownScorer(other.to_string())),
            };
        }

        if let Some(default) = &self.default {
            rule_set = match default {
                DefaultConfig::Named(name) => match name.as_str() {
                    "url" => rule_set.with_default(|context| context.url.clone()),
                    "favicon" => rule_set.with_default(|_| DEFAULT_FAVICON.to_string()),
                    "provider" => rule_set.with_default(|context| provider_from_url(&context.url)),
                    other => return Err(MetadataError::UnknownDefault(other.to_string())),
                },
                DefaultConfig::Literal { literal } => {
                    let literal = literal.clone();
                    rule_set.with_default(move |_| literal.clone())
                }
            };
        }

        for name in &self.processors {
            rule_set = rule_set.with_processor(processor_by_name(name)?);
        }

        Ok(rule_set)
    }
}

impl RuleConfig {
    pub fn build(&self) -> Result<RuleEntry> {
        let accessor = self.accessor.as_deref().unwrap_or("text");
        let entry = match accessor {
            "text" => RuleEntry::text(self.selector.as_str()),
            "html" => RuleEntry::new(self.selector.as_str(), |el| Some(el.html())),
            "inner_html" => RuleEntry::new(self.selector.as_str(), |el| Some(el.inner_html())),
            attr => match attr.strip_prefix("attr:") {
                Some(name) if !name.is_empty() => RuleEntry::attr(self.selector.as_str(), name),
                _ => return Err(MetadataError::UnknownAccessor(attr.to_string())),
            },
        };
        Ok(entry)
    }
}

fn processor_by_name(name: &str) -> Result<Processor> {
    let processor = match name {
        "absolute_url" => absolute_url_processor(),
        "split_commas" => Processor::split(|value, _| split_commas(&value)),
        "primary_language" => Processor::text(|value, _| primary_language(&value)),
        "lowercase" => Processor::text(|value, _| value.to_lowercase()),
        "uppercase" => Processor::text(|value, _| value.to_uppercase()),
        "trim" => Processor::text(|value, _| value.trim().to_string()),
        other => return Err(MetadataError::UnknownProcessor(other.to_string())),
    };
    Ok(processor)
}

/// Parse a JSON rule table and build it
pub fn load_rule_sets(json: &str) -> Result<RuleSetTable> {
    RuleSetConfig::from_json(json)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract_metadata_from_html;
    use crate::rules::BUILTIN_FIELDS;

    #[test]
    fn test_load_custom_table() {
        let json = r#"{
            "fields": [{
                "name": "author",
                "rules": [
                    { "selector": "meta[name=\"author\"]", "accessor": "attr:content" },
                    { "selector": ".byline" }
                ],
                "default": { "literal": "anonymous" },
                "processors": ["lowercase"]
            }]
        }"#;

        let table = load_rule_sets(json).unwrap();
        assert_eq!(table.len(), 1);

        let record = extract_metadata_from_html(
            r#"<p class="byline">Jane DOE</p>"#,
            "https://example.com/",
            Some(&table),
        )
        .unwrap();
        assert_eq!(record.text("author"), Some("jane doe"));

        let record =
            extract_metadata_from_html("<p></p>", "https://example.com/", Some(&table)).unwrap();
        assert_eq!(record.text("author"), Some("anonymous"));
    }

    #[test]
    fn test_extend_builtin_overrides_by_name() {
        let json = r#"{
            "extend_builtin": true,
            "fields": [
                { "name": "title", "rules": [{ "selector": "h1" }] },
                { "name": "favicon", "rules": [{ "selector": "link[rel=icon]", "accessor": "attr:href" }],
                  "scorers": ["sizes"], "default": "favicon", "processors": ["absolute_url"] }
            ]
        }"#;

        let table = load_rule_sets(json).unwrap();
        let names: Vec<&str> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(&names[..BUILTIN_FIELDS.len()], &BUILTIN_FIELDS[..]);
        assert_eq!(names.last(), Some(&"favicon"));

        let record = extract_metadata_from_html(
            r#"<title>Page</title><h1>Heading</h1>"#,
            "https://example.com/a/b",
            Some(&table),
        )
        .unwrap();
        assert_eq!(record.text("title"), Some("Heading"));
        assert_eq!(record.text("favicon"), Some("https://example.com/a/favicon.ico"));
    }

    #[test]
    fn test_keywords_from_config() {
        let json = r#"{ "fields": [{
            "name": "tags",
            "rules": [{ "selector": "meta[name=tags]", "accessor": "attr:content" }],
            "processors": ["split_commas"]
        }]}"#;
        let table = load_rule_sets(json).unwrap();
        let record = extract_metadata_from_html(
            r#"<meta name="tags" content="x, y">"#,
            "https://example.com/",
            Some(&table),
        )
        .unwrap();
        assert_eq!(record.list("tags"), Some(&["x".to_string(), "y".to_string()][..]));
    }

    #[test]
    fn test_html_accessors_and_uppercase() {
        let json = r#"{ "fields": [
            { "name": "outer", "rules": [{ "selector": "p.note", "accessor": "html" }] },
            { "name": "inner", "rules": [{ "selector": "p.note", "accessor": "inner_html" }] },
            { "name": "shout", "rules": [{ "selector": "p.note" }], "processors": ["uppercase"] }
        ]}"#;
        let table = load_rule_sets(json).unwrap();
        let record = extract_metadata_from_html(
            r#"<p class="note">Hi <b>there</b></p>"#,
            "https://example.com/",
            Some(&table),
        )
        .unwrap();

        assert_eq!(record.text("outer"), Some(r#"<p class="note">Hi <b>there</b></p>"#));
        assert_eq!(record.text("inner"), Some("Hi <b>there</b>"));
        assert_eq!(record.text("shout"), Some("HI THERE"));
    }

    #[test]
    fn test_unknown_accessor_message_lists_accessors() {
        let json = r#"{ "fields": [{ "name": "a", "rules": [{ "selector": "p", "accessor": "outer" }] }] }"#;
        let err = load_rule_sets(json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown accessor 'outer' (expected 'text', 'html', 'inner_html' or 'attr:<name>')"
        );
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let processor = r#"{ "fields": [{ "name": "a", "rules": [], "processors": ["rot13"] }] }"#;
        assert!(matches!(
            load_rule_sets(processor),
            Err(MetadataError::UnknownProcessor(name)) if name == "rot13"
        ));

        let accessor = r#"{ "fields": [{ "name": "a", "rules": [{ "selector": "p", "accessor": "attr:" }] }] }"#;
        assert!(matches!(
            load_rule_sets(accessor),
            Err(MetadataError::UnknownAccessor(_))
        ));

        let scorer = r#"{ "fields": [{ "name": "a", "rules": [], "scorers": ["length"] }] }"#;
        assert!(matches!(load_rule_sets(scorer), Err(MetadataError::UnknownScorer(_))));

        let default = r#"{ "fields": [{ "name": "a", "rules": [], "default": "now" }] }"#;
        assert!(matches!(load_rule_sets(default), Err(MetadataError::UnknownDefault(_))));
    }

    #[test]
    fn test_build_validates_table() {
        let bad_selector = r#"{ "fields": [{ "name": "a", "rules": [{ "selector": "p[" }] }] }"#;
        assert!(matches!(
            load_rule_sets(bad_selector),
            Err(MetadataError::InvalidSelector { .. })
        ));

        let bad_chain = r#"{ "fields": [{ "name": "a", "rules": [],
            "processors": ["split_commas", "lowercase"] }] }"#;
        assert!(matches!(
            load_rule_sets(bad_chain),
            Err(MetadataError::ProcessorShape { .. })
        ));

        let duplicate = r#"{ "fields": [{ "name": "a", "rules": [] }, { "name": "a", "rules": [] }] }"#;
        assert!(matches!(
            load_rule_sets(duplicate),
            Err(MetadataError::DuplicateField(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(load_rule_sets("{ fields"), Err(MetadataError::Json(_))));
    }
}
