//! Acervo (document collection) entity model and DTOs.

use engenha_core::types::{EntityId, Timestamp, WorkspaceId};
use serde::{Deserialize, Serialize};

use super::Identified;

/// A row from the `acervo` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcervoItem {
    pub id: EntityId,
    pub workspace_id: WorkspaceId,
    pub obra_id: Option<EntityId>,
    pub titulo: String,
    pub descricao: Option<String>,
    pub tipo_documento: String,
    pub arquivo_url: Option<String>,
    pub tamanho_bytes: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Identified for AcervoItem {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAcervoItem {
    pub obra_id: Option<EntityId>,
    pub titulo: String,
    pub descricao: Option<String>,
    pub tipo_documento: String,
    pub arquivo_url: Option<String>,
    pub tamanho_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAcervoItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obra_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_documento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arquivo_url: Option<String>,
}

/// List filters for the acervo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcervoFilters {
    pub obra_id: Option<EntityId>,
    pub tipo_documento: Option<String>,
    /// Case-insensitive substring of `titulo`.
    pub search: Option<String>,
}
