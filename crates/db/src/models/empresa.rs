//! Empresa (company) entity model and DTOs.

use engenha_core::types::{EntityId, Timestamp, WorkspaceId};
use serde::{Deserialize, Serialize};

use super::Identified;

/// A row from the `empresas` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empresa {
    pub id: EntityId,
    pub workspace_id: WorkspaceId,
    pub nome: String,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub responsavel_tecnico: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Identified for Empresa {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// DTO for creating a new empresa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEmpresa {
    pub nome: String,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub responsavel_tecnico: Option<String>,
}

/// DTO for updating an existing empresa. Only provided fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEmpresa {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endereco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsavel_tecnico: Option<String>,
}

/// Empresas have no list filters; the unit type keeps the store API uniform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmpresaFilters;
