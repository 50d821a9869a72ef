//! Observable state containers for the dashboard screens.
//!
//! Every store publishes its state on a `tokio::sync::watch` channel and
//! applies a load result only if no newer load was issued meanwhile.

pub mod billing;
pub mod dashboard;
pub mod resource;
pub mod resources;

use std::sync::atomic::{AtomicU64, Ordering};

pub use billing::{BillingOverview, BillingStore};
pub use dashboard::DashboardStore;
pub use resource::{Resource, ResourceState, ResourceStore};
pub use resources::{AcervoStore, Acervo, EmpresaStore, Empresas, ObraStore, Obras};

/// Monotonic load tokens. Only the response carrying the latest issued
/// token may touch store state.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every earlier one.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

/// State of a store holding a single loaded value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueState<T> {
    pub value: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ValueState<T> {
    fn default() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
        }
    }
}
