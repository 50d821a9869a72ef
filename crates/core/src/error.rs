use crate::types::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// A required precondition (an active session or workspace) does not
    /// hold. Raised before any remote call is made.
    #[error("{0}")]
    Precondition(String),
}
