//! Entity models and DTOs for the tables behind the dashboard.

pub mod acervo;
pub mod dashboard;
pub mod empresa;
pub mod obra;
pub mod plan;
pub mod profile;
pub mod subscription;

use engenha_core::types::EntityId;

/// A persisted record with a server-assigned identity.
pub trait Identified {
    fn id(&self) -> EntityId;
}
