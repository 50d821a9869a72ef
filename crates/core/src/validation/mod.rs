//! Form validation engine.
//!
//! Field rules, a pure-logic evaluator and the schemas for every form the
//! dashboard submits. Validation is advisory: it gates submission before
//! any remote call, but the hosted backend may still reject the input.

pub mod evaluator;
pub mod rules;
pub mod schema;
pub mod schemas;

pub use rules::{FieldViolation, RuleKind, ValidationErrors};
pub use schema::{Field, Schema};
