//! Headless state machines behind the dashboard's interactive controls.
//!
//! Rendering lives elsewhere; these types own the state transitions and
//! invoke exactly the callbacks the caller supplied.

pub mod dialog;
pub mod popover;
pub mod toggle;

pub use dialog::{ConfirmDialog, DialogVariant};
pub use popover::{ClickTarget, Popover};
pub use toggle::{CheckedState, Controlled, Toggle, Uncontrolled};
