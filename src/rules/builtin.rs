//! Built-in rule sets
//!
//! Open Graph, Twitter Card, legacy meta tags and link relations for the
//! standard preview fields.

use std::sync::OnceLock;

use scraper::ElementRef;

use super::{FieldRuleSet, Processor, RuleEntry, RuleSetTable};
use crate::transforms::{make_url_absolute, primary_language, provider_from_url, split_commas};

/// Fallback icon path, resolved against the document URL
pub const DEFAULT_FAVICON: &str = "favicon.ico";

/// Field names of the built-in table, in evaluation order
pub const BUILTIN_FIELDS: [&str; 9] = [
    "description",
    "icon",
    "image",
    "keywords",
    "title",
    "language",
    "type",
    "url",
    "provider",
];

/// Score an icon by the first number in its `sizes` attribute (`32x32` -> 32)
pub fn icon_size_score(element: &ElementRef<'_>, _score: i64) -> Option<i64> {
    let sizes = element.value().attr("sizes")?;
    let digits: String = sizes
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

pub fn absolute_url_processor() -> Processor {
    Processor::text(|value, context| make_url_absolute(&context.url, &value))
}

pub fn description_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![
        RuleEntry::attr(r#"meta[property="og:description"]"#, "content"),
        RuleEntry::attr(r#"meta[name="description" i]"#, "content"),
    ])
}

pub fn icon_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![
        RuleEntry::attr(r#"link[rel="apple-touch-icon"]"#, "href"),
        RuleEntry::attr(r#"link[rel="apple-touch-icon-precomposed"]"#, "href"),
        RuleEntry::attr(r#"link[rel="icon" i]"#, "href"),
        RuleEntry::attr(r#"link[rel="fluid-icon"]"#, "href"),
        RuleEntry::attr(r#"link[rel="shortcut icon"]"#, "href"),
        RuleEntry::attr(r#"link[rel="Shortcut Icon"]"#, "href"),
        RuleEntry::attr(r#"link[rel="mask-icon"]"#, "href"),
    ])
    .with_scorer(icon_size_score)
    .with_default(|_| DEFAULT_FAVICON.to_string())
    .with_processor(absolute_url_processor())
}

pub fn image_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![
        RuleEntry::attr(r#"meta[property="og:image:secure_url"]"#, "content"),
        RuleEntry::attr(r#"meta[property="og:image:url"]"#, "content"),
        RuleEntry::attr(r#"meta[property="og:image"]"#, "content"),
        RuleEntry::attr(r#"meta[name="twitter:image"]"#, "content"),
        RuleEntry::attr(r#"meta[property="twitter:image"]"#, "content"),
        RuleEntry::attr(r#"meta[name="thumbnail"]"#, "content"),
    ])
    .with_processor(absolute_url_processor())
}

pub fn keywords_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![RuleEntry::attr(
        r#"meta[name="keywords" i]"#,
        "content",
    )])
    .with_processor(Processor::split(|value, _| split_commas(&value)))
}

pub fn title_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![
        RuleEntry::attr(r#"meta[property="og:title"]"#, "content"),
        RuleEntry::attr(r#"meta[name="twitter:title"]"#, "content"),
        RuleEntry::attr(r#"meta[property="twitter:title"]"#, "content"),
        RuleEntry::attr(r#"meta[name="hdl"]"#, "content"),
        RuleEntry::text("title"),
    ])
}

pub fn language_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![
        RuleEntry::attr("html[lang]", "lang"),
        RuleEntry::attr(r#"meta[name="language" i]"#, "content"),
    ])
    .with_processor(Processor::text(|value, _| primary_language(&value)))
}

pub fn type_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![RuleEntry::attr(
        r#"meta[property="og:type"]"#,
        "content",
    )])
}

pub fn url_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![
        RuleEntry::attr("a.amp-canurl", "href"),
        RuleEntry::attr(r#"link[rel="canonical"]"#, "href"),
        RuleEntry::attr(r#"meta[property="og:url"]"#, "content"),
    ])
    .with_default(|context| context.url.clone())
    .with_processor(absolute_url_processor())
}

pub fn provider_rules() -> FieldRuleSet {
    FieldRuleSet::new(vec![RuleEntry::attr(
        r#"meta[property="og:site_name"]"#,
        "content",
    )])
    .with_default(|context| provider_from_url(&context.url))
}

/// A fresh copy of the built-in table, for callers that want to extend it
pub fn default_rule_sets() -> RuleSetTable {
    let mut table = RuleSetTable::new();
    table.insert("description", description_rules());
    table.insert("icon", icon_rules());
    table.insert("image", image_rules());
    table.insert("keywords", keywords_rules());
    table.insert("title", title_rules());
    table.insert("language", language_rules());
    table.insert("type", type_rules());
    table.insert("url", url_rules());
    table.insert("provider", provider_rules());
    table
}

/// The shared built-in table, built on first use
pub fn builtin_rule_sets() -> &'static RuleSetTable {
    static TABLE: OnceLock<RuleSetTable> = OnceLock::new();
    TABLE.get_or_init(default_rule_sets)
}
