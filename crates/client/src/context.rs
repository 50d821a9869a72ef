//! Explicit session and workspace context.
//!
//! Created empty at startup, established after sign-in or an auth
//! callback, and cleared on sign-out. Stores and flows receive a clone in
//! their constructors and observe changes through [`SessionContext::subscribe`].

use std::sync::Arc;

use engenha_core::types::{EntityId, WorkspaceId};
use engenha_db::Session;
use tokio::sync::watch;

/// Snapshot of who is signed in and which workspace they are working in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub workspace_id: Option<WorkspaceId>,
}

/// Shared, observable session context. Clones share the same state.
#[derive(Clone)]
pub struct SessionContext {
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Adopt a freshly authenticated session.
    pub fn establish(&self, session: Session, workspace_id: Option<WorkspaceId>) {
        tracing::info!(
            user_id = %session.user.id,
            workspace_id = ?workspace_id,
            "Session established"
        );
        self.state.send_replace(SessionState {
            session: Some(session),
            workspace_id,
        });
    }

    /// Change the active workspace. Subscribers are only notified when the
    /// workspace actually changes.
    pub fn switch_workspace(&self, workspace_id: Option<WorkspaceId>) {
        let changed = self.state.send_if_modified(|state| {
            if state.workspace_id == workspace_id {
                return false;
            }
            state.workspace_id = workspace_id;
            true
        });
        if changed {
            tracing::debug!(workspace_id = ?workspace_id, "Workspace switched");
        }
    }

    /// Tear the session down.
    pub fn clear(&self) {
        self.state.send_replace(SessionState::default());
        tracing::info!("Session cleared");
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        self.state.borrow().workspace_id
    }

    pub fn user_id(&self) -> Option<EntityId> {
        self.state.borrow().session.as_ref().map(|s| s.user.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
