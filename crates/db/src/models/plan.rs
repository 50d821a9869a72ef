//! Billing plan models.

use engenha_core::money::format_brl;
use serde::{Deserialize, Serialize};

/// A row from the `plans` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanRecord {
    pub id: String,
    pub nome: String,
    pub preco_centavos: i64,
    #[serde(default)]
    pub recursos: Vec<String>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub ordem: i32,
}

/// A plan shaped for display on the pricing cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Formatted monthly price, e.g. `R$ 99,90`.
    pub price: String,
    /// Feature bullet points in display order.
    pub features: Vec<String>,
    /// Highlighted as the recommended plan.
    pub popular: bool,
}

impl From<PlanRecord> for Plan {
    fn from(record: PlanRecord) -> Self {
        Self {
            price: format_brl(record.preco_centavos),
            id: record.id,
            name: record.nome,
            features: record.recursos,
            popular: record.popular,
        }
    }
}
