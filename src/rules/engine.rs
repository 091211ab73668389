//! Field evaluation
//!
//! Every element matched by rule `i` of `n` starts with score `n - i`, so
//! declaration order alone sets precedence. Scorers may then override the
//! score. Only a strictly higher score replaces the current value, which
//! keeps the first maximal match.

use scraper::Html;
use tracing::{debug, trace};

use super::{Context, FieldRuleSet, FieldValue};
use crate::error::Result;

const UNNAMED_FIELD: &str = "(unnamed)";

/// Evaluate a single rule set against `document`.
///
/// Returns `Ok(None)` when nothing matched and there is no default. A
/// selector that fails to parse is returned as an error.
pub fn evaluate_field(
    rule_set: &FieldRuleSet,
    document: &Html,
    context: &Context,
) -> Result<Option<FieldValue>> {
    evaluate_named(UNNAMED_FIELD, rule_set, document, context)
}

pub(crate) fn evaluate_named(
    field: &str,
    rule_set: &FieldRuleSet,
    document: &Html,
    context: &Context,
) -> Result<Option<FieldValue>> {
    let rule_count = rule_set.rules.len() as i64;
    let mut max_score: i64 = 0;
    let mut max_value: Option<String> = None;

    for (index, rule) in rule_set.rules.iter().enumerate() {
        let selector = rule.compiled(field)?;
        let base_score = rule_count - index as i64;

        for element in document.select(selector) {
            let score = rule_set
                .scorers
                .iter()
                .fold(base_score, |score, scorer| scorer(&element, score).unwrap_or(score));
            trace!("{}: '{}' candidate scored {}", field, rule.selector(), score);

            if score <= max_score {
                continue;
            }

            // An element that yields nothing does not claim the slot
            match rule.extract(&element) {
                Some(value) if !value.trim().is_empty() => {
                    debug!("{}: '{}' wins with score {}", field, rule.selector(), score);
                    max_score = score;
                    max_value = Some(value);
                }
                _ => trace!("{}: '{}' matched without a value", field, rule.selector()),
            }
        }
    }

    let value = match (max_value, &rule_set.default_value) {
        (Some(value), _) => value,
        (None, Some(default_value)) => {
            let value = default_value(context);
            debug!("{}: using default '{}'", field, value);
            value
        }
        (None, None) => return Ok(None),
    };

    if value.trim().is_empty() {
        return Ok(None);
    }

    match rule_set.process(field, FieldValue::Text(value), context)? {
        FieldValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                Ok(Some(FieldValue::Text(text.to_string())))
            }
        }
        FieldValue::List(items) if items.is_empty() => Ok(None),
        list => Ok(Some(list)),
    }
}
