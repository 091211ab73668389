//! Page metadata extraction driven by declarative rule tables
//!
//! Extracts preview metadata from a parsed HTML document:
//! - title, description, type, language, keywords
//! - canonical URL, icon and preview image (resolved to absolute URLs)
//! - provider (site) name, falling back to a name derived from the host
//!
//! Each field is a [`FieldRuleSet`] of prioritized selectors. Callers can
//! extend or replace the built-in table in code or as JSON.

pub mod config;
pub mod error;
pub mod ffi;
pub mod metadata;
pub mod rules;
pub mod transforms;

pub use config::{load_rule_sets, RuleSetConfig};
pub use error::{MetadataError, Result};
pub use ffi::*;
pub use metadata::{extract_metadata, extract_metadata_from_html, MetadataRecord};
pub use rules::{
    builtin_rule_sets, default_rule_sets, evaluate_field, Context, FieldRuleSet, FieldValue,
    Processor, RuleEntry, RuleSetTable,
};
pub use transforms::{derive_provider_name, make_url_absolute};
