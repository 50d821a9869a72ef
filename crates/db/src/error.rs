use engenha_core::types::EntityId;

use crate::gateway::GatewayError;

/// Failure of a repository call.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The gateway call failed; `context` says what we were doing.
    #[error("{context}: {source}")]
    Gateway {
        context: &'static str,
        #[source]
        source: GatewayError,
    },

    /// A returned row did not match the entity model.
    #[error("Failed to decode {entity} record: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: EntityId },
}

impl RepoError {
    /// Build a `map_err` adapter attaching `context` to a gateway error.
    pub fn context(context: &'static str) -> impl FnOnce(GatewayError) -> RepoError {
        move |source| RepoError::Gateway { context, source }
    }

    /// The backend's own message, without our context prefix.
    pub fn gateway_message(&self) -> Option<String> {
        match self {
            RepoError::Gateway { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}
