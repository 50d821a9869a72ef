//! Domain primitives shared by every Engenha crate.
//!
//! Nothing in here performs I/O: types, the domain error, the validation
//! engine and its schemas, the auth error translator, currency formatting
//! and the headless state machines behind the dashboard controls.

pub mod controls;
pub mod error;
pub mod error_messages;
pub mod money;
pub mod types;
pub mod validation;
