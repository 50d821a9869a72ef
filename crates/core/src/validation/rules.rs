//! Validation rule and result types.

use std::fmt;

use serde::Serialize;

/// What a single rule checks. Every kind except [`RuleKind::Required`]
/// passes when the field is absent, so optional fields only need the
/// rules that constrain a supplied value.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Present, not null and not an empty string.
    Required,
    /// String with at least this many characters.
    MinLength(usize),
    /// String with at most this many characters.
    MaxLength(usize),
    /// String with exactly this many characters.
    ExactLength(usize),
    /// Number greater than or equal to the bound.
    MinValue(f64),
    /// String drawn from a fixed set.
    OneOf(&'static [&'static str]),
    /// String matching a regular expression.
    Pattern(&'static str),
    /// String holding a syntactically valid e-mail address.
    Email,
    /// String holding an absolute URL.
    Url,
    /// String holding an ISO `YYYY-MM-DD` date.
    Date,
    /// Value equal to another field of the same record.
    Matches(&'static str),
}

impl RuleKind {
    /// Stable identifier reported in [`FieldViolation::rule`].
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::MinLength(_) => "min_length",
            RuleKind::MaxLength(_) => "max_length",
            RuleKind::ExactLength(_) => "exact_length",
            RuleKind::MinValue(_) => "min_value",
            RuleKind::OneOf(_) => "one_of",
            RuleKind::Pattern(_) => "pattern",
            RuleKind::Email => "email",
            RuleKind::Url => "url",
            RuleKind::Date => "date",
            RuleKind::Matches(_) => "matches",
        }
    }
}

/// A rule bound to its user-facing message.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub kind: RuleKind,
    pub message: String,
}

/// A single field-level rule violation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub rule: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Every violation found while checking one record.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Names of the offending fields, in schema order.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }

    /// The violation reported for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
