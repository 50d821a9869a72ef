//! Dashboard home aggregates.

use std::sync::Arc;

use engenha_db::models::dashboard::DashboardStats;
use engenha_db::repositories::DashboardRepo;
use engenha_db::DataGateway;
use tokio::sync::watch;

use super::{RequestSequence, ValueState};
use crate::context::SessionContext;

pub struct DashboardStore {
    gateway: Arc<dyn DataGateway>,
    context: SessionContext,
    state: watch::Sender<ValueState<DashboardStats>>,
    sequence: RequestSequence,
}

impl DashboardStore {
    pub fn new(gateway: Arc<dyn DataGateway>, context: SessionContext) -> Self {
        let (state, _) = watch::channel(ValueState::default());
        Self {
            gateway,
            context,
            state,
            sequence: RequestSequence::new(),
        }
    }

    pub fn snapshot(&self) -> ValueState<DashboardStats> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ValueState<DashboardStats>> {
        self.state.subscribe()
    }

    /// Load the stats for the current workspace. Without a workspace the
    /// store settles with zeroed stats and no gateway call.
    pub async fn load(&self) {
        let token = self.sequence.issue();
        let Some(workspace_id) = self.context.workspace_id() else {
            self.state.send_replace(ValueState {
                value: Some(DashboardStats::default()),
                ..ValueState::default()
            });
            return;
        };

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = DashboardRepo::stats(self.gateway.as_ref(), workspace_id).await;
        let applied = self.state.send_if_modified(|state| {
            if !self.sequence.is_latest(token) {
                return false;
            }
            state.loading = false;
            match result {
                Ok(stats) => state.value = Some(stats),
                Err(err) => {
                    tracing::error!(error = %err, "Failed to load dashboard stats");
                    state.error = Some(err.to_string());
                }
            }
            true
        });
        if !applied {
            tracing::warn!(token, "Discarding superseded dashboard response");
        }
    }
}
