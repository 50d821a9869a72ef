//! Dashboard aggregate model.

use engenha_core::types::{Date, EntityId};
use serde::{Deserialize, Serialize};

/// Headline numbers for the dashboard home.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_empresas: u64,
    pub total_obras: u64,
    pub obras_em_andamento: u64,
    pub obras_concluidas: u64,
    pub total_acervo: u64,
    /// Sum of `valor_total` across the workspace's obras.
    pub valor_total_contratos: f64,
    pub recent_obras: Vec<ObraSummary>,
}

/// The slice of an obra shown in the "recent" list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObraSummary {
    pub id: EntityId,
    pub descricao_obra: String,
    pub cidade: String,
    pub estado: String,
    pub data_inicio: Date,
}
