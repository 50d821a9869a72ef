//! Obra (construction work) entity model and DTOs.

use engenha_core::types::{Date, EntityId, Timestamp, WorkspaceId};
use serde::{Deserialize, Serialize};

use super::Identified;

/// Legal nature of the contracting party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContratanteTipo {
    PessoaFisica,
    PessoaJuridica,
    OrgaoPublico,
}

/// A row from the `obras` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obra {
    pub id: EntityId,
    pub workspace_id: WorkspaceId,
    pub empresa_id: Option<EntityId>,
    pub engenheiro_id: Option<EntityId>,
    pub created_by: Option<EntityId>,
    pub descricao_obra: String,
    pub finalidade_obra: Option<String>,
    pub observacoes: Option<String>,
    pub cidade: String,
    pub estado: String,
    pub endereco_obra: Option<String>,
    pub data_inicio: Date,
    pub data_conclusao: Option<Date>,
    pub contratante_nome: Option<String>,
    pub contratante_tipo: Option<ContratanteTipo>,
    pub contratante_documento: Option<String>,
    pub numero_contrato: Option<String>,
    pub valor_total: Option<f64>,
    pub is_public: Option<bool>,
    pub categorias: Option<Vec<String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Obra {
    /// An obra without a completion date is still in progress.
    pub fn em_andamento(&self) -> bool {
        self.data_conclusao.is_none()
    }
}

impl Identified for Obra {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// DTO for creating a new obra.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateObra {
    pub empresa_id: Option<EntityId>,
    pub engenheiro_id: Option<EntityId>,
    pub descricao_obra: String,
    pub finalidade_obra: Option<String>,
    pub observacoes: Option<String>,
    pub cidade: String,
    pub estado: String,
    pub endereco_obra: Option<String>,
    pub data_inicio: Date,
    pub data_conclusao: Option<Date>,
    pub contratante_nome: Option<String>,
    pub contratante_tipo: Option<ContratanteTipo>,
    pub contratante_documento: Option<String>,
    pub numero_contrato: Option<String>,
    pub valor_total: Option<f64>,
    pub is_public: Option<bool>,
    pub categorias: Option<Vec<String>>,
}

/// DTO for updating an existing obra. Only provided fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateObra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empresa_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engenheiro_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao_obra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalidade_obra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endereco_obra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_conclusao: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contratante_nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contratante_tipo: Option<ContratanteTipo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contratante_documento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero_contrato: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorias: Option<Vec<String>>,
}

/// List filters for obras.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObraFilters {
    pub empresa_id: Option<EntityId>,
    pub estado: Option<String>,
    /// Case-insensitive substring of `descricao_obra`.
    pub search: Option<String>,
}
