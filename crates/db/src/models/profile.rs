//! User profile model linking an auth user to a workspace.

use engenha_core::types::{EntityId, WorkspaceId};
use serde::{Deserialize, Serialize};

/// A row from the `profiles` table. `id` is the auth user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: EntityId,
    pub workspace_id: Option<WorkspaceId>,
    pub nome: Option<String>,
}
