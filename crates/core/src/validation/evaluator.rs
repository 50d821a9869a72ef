//! Rule evaluator -- pure logic, no I/O.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use validator::{ValidateEmail, ValidateUrl};

use super::rules::{FieldRule, FieldViolation, RuleKind};

/// Compiled [`RuleKind::Pattern`] expressions keyed by source; `None`
/// marks a pattern that failed to compile.
static PATTERN_CACHE: LazyLock<RwLock<HashMap<&'static str, Option<Regex>>>> =
    LazyLock::new(Default::default);

/// Evaluate one field's rules in declaration order.
///
/// Stops at the first failing rule so each field reports at most one
/// violation (a missing required field is not also "too short").
pub fn evaluate_field(
    field: &str,
    rules: &[FieldRule],
    data: &Map<String, Value>,
) -> Option<FieldViolation> {
    let value = data.get(field);
    rules
        .iter()
        .find(|rule| !rule_passes(&rule.kind, value, data))
        .map(|rule| FieldViolation {
            field: field.to_string(),
            rule: rule.kind.name(),
            message: rule.message.clone(),
            value: value.filter(|v| !v.is_null()).cloned(),
        })
}

fn rule_passes(kind: &RuleKind, value: Option<&Value>, data: &Map<String, Value>) -> bool {
    if let RuleKind::Required = kind {
        return is_present(value);
    }
    let value = match value {
        Some(v) if is_present(Some(v)) => v,
        _ => return true, // only `required` enforces presence
    };

    match kind {
        RuleKind::Required => true,
        RuleKind::MinLength(min) => char_len(value).map_or(false, |len| len >= *min),
        RuleKind::MaxLength(max) => char_len(value).map_or(false, |len| len <= *max),
        RuleKind::ExactLength(n) => char_len(value).map_or(false, |len| len == *n),
        RuleKind::MinValue(min) => value.as_f64().map_or(false, |num| num >= *min),
        RuleKind::OneOf(allowed) => value.as_str().map_or(false, |s| allowed.contains(&s)),
        RuleKind::Pattern(pattern) => value
            .as_str()
            .map_or(false, |s| compiled(*pattern).map_or(true, |re| re.is_match(s))),
        RuleKind::Email => value.as_str().map_or(false, |s| s.validate_email()),
        RuleKind::Url => value.as_str().map_or(false, |s| s.validate_url()),
        RuleKind::Date => value
            .as_str()
            .map_or(false, |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
        RuleKind::Matches(other) => data.get(*other) == Some(value),
    }
}

/// Compile once per process. An invalid pattern yields `None` and the rule
/// passes.
fn compiled(pattern: &'static str) -> Option<Regex> {
    if let Some(cached) = PATTERN_CACHE.read().ok().and_then(|c| c.get(pattern).cloned()) {
        return cached;
    }
    let regex = Regex::new(pattern).ok();
    if let Ok(mut cache) = PATTERN_CACHE.write() {
        cache.insert(pattern, regex.clone());
    }
    regex
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => true,
    }
}

fn char_len(value: &Value) -> Option<usize> {
    value.as_str().map(|s| s.chars().count())
}
