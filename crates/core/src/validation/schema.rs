//! Declarative form schemas built from [`FieldRule`]s.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::evaluator::evaluate_field;
use super::rules::{FieldRule, FieldViolation, RuleKind, ValidationErrors};

/// Rules attached to one input field, built fluently.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    rules: Vec<FieldRule>,
}

impl Field {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    fn rule(mut self, kind: RuleKind, message: impl Into<String>) -> Self {
        self.rules.push(FieldRule {
            kind,
            message: message.into(),
        });
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(RuleKind::Required, message)
    }

    pub fn min_length(self, min: usize, message: impl Into<String>) -> Self {
        self.rule(RuleKind::MinLength(min), message)
    }

    pub fn max_length(self, max: usize, message: impl Into<String>) -> Self {
        self.rule(RuleKind::MaxLength(max), message)
    }

    pub fn exact_length(self, len: usize, message: impl Into<String>) -> Self {
        self.rule(RuleKind::ExactLength(len), message)
    }

    pub fn min_value(self, min: f64, message: impl Into<String>) -> Self {
        self.rule(RuleKind::MinValue(min), message)
    }

    pub fn one_of(self, values: &'static [&'static str], message: impl Into<String>) -> Self {
        self.rule(RuleKind::OneOf(values), message)
    }

    pub fn pattern(self, pattern: &'static str, message: impl Into<String>) -> Self {
        self.rule(RuleKind::Pattern(pattern), message)
    }

    pub fn email(self, message: impl Into<String>) -> Self {
        self.rule(RuleKind::Email, message)
    }

    pub fn url(self, message: impl Into<String>) -> Self {
        self.rule(RuleKind::Url, message)
    }

    pub fn date(self, message: impl Into<String>) -> Self {
        self.rule(RuleKind::Date, message)
    }

    pub fn matches(self, other: &'static str, message: impl Into<String>) -> Self {
        self.rule(RuleKind::Matches(other), message)
    }
}

/// An ordered set of field rules for one form.
///
/// Fields the schema does not mention are passed through untouched to
/// deserialization; the remote side remains the authority of record.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check every field, collecting one violation per failing field.
    pub fn validate(&self, data: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let violations: Vec<FieldViolation> = self
            .fields
            .iter()
            .filter_map(|field| evaluate_field(field.name, &field.rules, data))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { violations })
        }
    }

    /// Validate a raw form object and deserialize it into `T`.
    ///
    /// Blank strings are treated as "not provided" so optional fields
    /// submitted empty by a form arrive as `None`.
    pub fn parse<T: DeserializeOwned>(&self, input: &Value) -> Result<T, ValidationErrors> {
        let Some(object) = input.as_object() else {
            return Err(single_violation(
                "",
                "type",
                "O formulário deve ser um objeto.",
            ));
        };

        let normalized: Map<String, Value> = object
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) if s.trim().is_empty() => Value::Null,
                    other => other.clone(),
                };
                (key.clone(), value)
            })
            .collect();

        self.validate(&normalized)?;

        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| single_violation("", "type", &e.to_string()))
    }
}

fn single_violation(field: &str, rule: &'static str, message: &str) -> ValidationErrors {
    ValidationErrors {
        violations: vec![FieldViolation {
            field: field.to_string(),
            rule,
            message: message.to_string(),
            value: None,
        }],
    }
}
