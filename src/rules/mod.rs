//! Declarative rule tables
//!
//! A field is described by a [`FieldRuleSet`]: ordered (selector, extractor)
//! entries, optional scorers, an optional default and a processor chain.
//! A [`RuleSetTable`] maps field names to rule sets in declaration order.

mod builtin;
pub(crate) mod engine;

pub use builtin::*;
pub use engine::evaluate_field;

use std::fmt;
use std::sync::Arc;

use scraper::{ElementRef, Selector};
use serde::Serialize;

use crate::error::{MetadataError, Result};

/// Reads a value out of a matched element
pub type Extractor = Arc<dyn Fn(&ElementRef<'_>) -> Option<String> + Send + Sync>;

/// Returns an overriding score for a candidate, or `None` to keep the current one
pub type Scorer = Arc<dyn Fn(&ElementRef<'_>, i64) -> Option<i64> + Send + Sync>;

/// Computes a fallback when no rule produced a value
pub type DefaultValue = Arc<dyn Fn(&Context) -> String + Send + Sync>;

type TextFn = Arc<dyn Fn(String, &Context) -> String + Send + Sync>;
type SplitFn = Arc<dyn Fn(String, &Context) -> Vec<String> + Send + Sync>;
type ListFn = Arc<dyn Fn(Vec<String>, &Context) -> Vec<String> + Send + Sync>;

/// Per-extraction data handed to defaults and processors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Resolved absolute URL of the document
    pub url: String,
}

impl Context {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A field value: plain text, or a list after a splitting processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::List(items) => Some(items),
        }
    }

    fn shape(&self) -> Shape {
        match self {
            FieldValue::Text(_) => Shape::Text,
            FieldValue::List(_) => Shape::List,
        }
    }
}

/// Value shape accepted or produced by a processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Text,
    List,
}

impl Shape {
    fn name(self) -> &'static str {
        match self {
            Shape::Text => "text",
            Shape::List => "list",
        }
    }
}

/// A post-processing step, typed by the shape it maps between
#[derive(Clone)]
pub enum Processor {
    /// text -> text
    Text(TextFn),
    /// text -> list
    Split(SplitFn),
    /// list -> list
    List(ListFn),
}

impl Processor {
    pub fn text<F>(f: F) -> Self
    where
        F: Fn(String, &Context) -> String + Send + Sync + 'static,
    {
        Processor::Text(Arc::new(f))
    }

    pub fn split<F>(f: F) -> Self
    where
        F: Fn(String, &Context) -> Vec<String> + Send + Sync + 'static,
    {
        Processor::Split(Arc::new(f))
    }

    pub fn list<F>(f: F) -> Self
    where
        F: Fn(Vec<String>, &Context) -> Vec<String> + Send + Sync + 'static,
    {
        Processor::List(Arc::new(f))
    }

    pub fn accepts(&self) -> Shape {
        match self {
            Processor::Text(_) | Processor::Split(_) => Shape::Text,
            Processor::List(_) => Shape::List,
        }
    }

    pub fn produces(&self) -> Shape {
        match self {
            Processor::Text(_) => Shape::Text,
            Processor::Split(_) | Processor::List(_) => Shape::List,
        }
    }

    /// Apply to `value`, or hand the value back if its shape is wrong
    fn apply(
        &self,
        value: FieldValue,
        context: &Context,
    ) -> std::result::Result<FieldValue, FieldValue> {
        match (self, value) {
            (Processor::Text(f), FieldValue::Text(s)) => Ok(FieldValue::Text(f(s, context))),
            (Processor::Split(f), FieldValue::Text(s)) => Ok(FieldValue::List(f(s, context))),
            (Processor::List(f), FieldValue::List(items)) => {
                Ok(FieldValue::List(f(items, context)))
            }
            (_, other) => Err(other),
        }
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Processor({} -> {})", self.accepts().name(), self.produces().name())
    }
}

/// One way of finding a field's value: a selector and what to read from matches.
///
/// The selector is parsed once, when the entry is built. A pattern that does
/// not parse is kept and reported when the entry is validated or evaluated.
#[derive(Clone)]
pub struct RuleEntry {
    selector: String,
    compiled: std::result::Result<Selector, String>,
    extractor: Extractor,
}

impl RuleEntry {
    pub fn new<F>(selector: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&ElementRef<'_>) -> Option<String> + Send + Sync + 'static,
    {
        let selector = selector.into();
        let compiled = Selector::parse(&selector).map_err(|e| e.to_string());
        Self {
            selector,
            compiled,
            extractor: Arc::new(extractor),
        }
    }

    /// Read attribute `name` from matched elements
    pub fn attr(selector: impl Into<String>, name: &str) -> Self {
        let name = name.to_string();
        Self::new(selector, move |el| el.value().attr(&name).map(String::from))
    }

    /// Read the text content of matched elements
    pub fn text(selector: impl Into<String>) -> Self {
        Self::new(selector, |el| Some(el.text().collect::<String>()))
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn extract(&self, element: &ElementRef<'_>) -> Option<String> {
        (self.extractor)(element)
    }

    /// The parsed selector, or the parse failure attributed to `field`
    pub(crate) fn compiled(&self, field: &str) -> Result<&Selector> {
        self.compiled
            .as_ref()
            .map_err(|reason| MetadataError::InvalidSelector {
                field: field.to_string(),
                selector: self.selector.clone(),
                reason: reason.clone(),
            })
    }
}

impl fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEntry")
            .field("selector", &self.selector)
            .field("valid", &self.compiled.is_ok())
            .finish_non_exhaustive()
    }
}

/// Everything needed to extract one field
#[derive(Clone, Default)]
pub struct FieldRuleSet {
    /// Earlier entries have higher priority
    pub rules: Vec<RuleEntry>,
    pub scorers: Vec<Scorer>,
    pub default_value: Option<DefaultValue>,
    pub processors: Vec<Processor>,
}

impl FieldRuleSet {
    pub fn new(rules: Vec<RuleEntry>) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    pub fn with_scorer<F>(mut self, scorer: F) -> Self
    where
        F: Fn(&ElementRef<'_>, i64) -> Option<i64> + Send + Sync + 'static,
    {
        self.scorers.push(Arc::new(scorer));
        self
    }

    pub fn with_default<F>(mut self, default_value: F) -> Self
    where
        F: Fn(&Context) -> String + Send + Sync + 'static,
    {
        self.default_value = Some(Arc::new(default_value));
        self
    }

    pub fn with_processor(mut self, processor: Processor) -> Self {
        self.processors.push(processor);
        self
    }

    /// Run the processor chain over `value`
    pub(crate) fn process(
        &self,
        field: &str,
        mut value: FieldValue,
        context: &Context,
    ) -> Result<FieldValue> {
        for (index, processor) in self.processors.iter().enumerate() {
            value = processor.apply(value, context).map_err(|wrong| {
                MetadataError::ProcessorShape {
                    field: field.to_string(),
                    index,
                    expected: processor.accepts().name(),
                    found: wrong.shape().name(),
                }
            })?;
        }
        Ok(value)
    }

    /// Parse all selectors and check the processor chain lines up
    pub fn validate(&self, field: &str) -> Result<()> {
        for rule in &self.rules {
            rule.compiled(field)?;
        }

        let mut shape = Shape::Text;
        for (index, processor) in self.processors.iter().enumerate() {
            if processor.accepts() != shape {
                return Err(MetadataError::ProcessorShape {
                    field: field.to_string(),
                    index,
                    expected: processor.accepts().name(),
                    found: shape.name(),
                });
            }
            shape = processor.produces();
        }
        Ok(())
    }
}

impl fmt::Debug for FieldRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRuleSet")
            .field("rules", &self.rules)
            .field("scorers", &self.scorers.len())
            .field("default_value", &self.default_value.is_some())
            .field("processors", &self.processors)
            .finish()
    }
}

/// Field name -> rule set, in declaration order
#[derive(Debug, Clone, Default)]
pub struct RuleSetTable {
    fields: Vec<(String, FieldRuleSet)>,
}

impl RuleSetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, or replace an existing one in place
    pub fn insert(&mut self, name: impl Into<String>, rule_set: FieldRuleSet) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = rule_set,
            None => self.fields.push((name, rule_set)),
        }
    }

    /// Add a field that must not exist yet
    pub fn try_add(&mut self, name: impl Into<String>, rule_set: FieldRuleSet) -> Result<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(MetadataError::DuplicateField(name));
        }
        self.fields.push((name, rule_set));
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldRuleSet> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&FieldRuleSet> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rule_set)| rule_set)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRuleSet)> {
        self.fields.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check every field's selectors and processor chain
    pub fn validate(&self) -> Result<()> {
        self.iter()
            .try_for_each(|(name, rule_set)| rule_set.validate(name))
    }
}
