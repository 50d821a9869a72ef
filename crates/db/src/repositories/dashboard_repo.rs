//! Aggregates for the dashboard home.

use engenha_core::types::WorkspaceId;
use serde_json::Value;

use super::decode_rows;
use crate::error::RepoError;
use crate::gateway::{DataGateway, Query};
use crate::models::dashboard::{DashboardStats, ObraSummary};

const RECENT_OBRAS_LIMIT: usize = 5;

/// Alias of the contract-value aggregate in the response row.
const CONTRACT_TOTAL: &str = "total";

pub struct DashboardRepo;

impl DashboardRepo {
    /// Compute the headline counts, contract total and most recent obras
    /// for a workspace. The independent reads run concurrently.
    pub async fn stats(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
    ) -> Result<DashboardStats, RepoError> {
        let context = RepoError::context;
        let scoped = |table: &str| Query::table(table).eq("workspace_id", workspace_id);

        let empresas = scoped("empresas");
        let obras = scoped("obras");
        let em_andamento = scoped("obras").is_null("data_conclusao");
        let acervo = scoped("acervo");
        let valores = contract_total_query(workspace_id);
        let recentes = scoped("obras")
            .select("id,descricao_obra,cidade,estado,data_inicio")
            .order_by("created_at", false)
            .limit(RECENT_OBRAS_LIMIT);

        let (total_empresas, total_obras, obras_em_andamento, total_acervo, valor_rows, recent_rows) =
            futures::try_join!(
                async { gateway.count(&empresas).await.map_err(context("Erro ao contar empresas")) },
                async { gateway.count(&obras).await.map_err(context("Erro ao contar obras")) },
                async {
                    gateway
                        .count(&em_andamento)
                        .await
                        .map_err(context("Erro ao contar obras em andamento"))
                },
                async { gateway.count(&acervo).await.map_err(context("Erro ao contar acervo")) },
                async {
                    gateway
                        .select(&valores)
                        .await
                        .map_err(context("Erro ao somar contratos"))
                },
                async {
                    gateway
                        .select(&recentes)
                        .await
                        .map_err(context("Erro ao carregar obras recentes"))
                },
            )?;

        let recent_obras: Vec<ObraSummary> = decode_rows("ObraSummary", recent_rows)?;

        tracing::debug!(
            %workspace_id,
            total_obras,
            total_empresas,
            "Dashboard stats loaded"
        );

        Ok(DashboardStats {
            total_empresas,
            total_obras,
            obras_em_andamento,
            obras_concluidas: total_obras.saturating_sub(obras_em_andamento),
            total_acervo,
            valor_total_contratos: contract_total(&valor_rows),
            recent_obras,
        })
    }
}

/// Server-side `SUM(valor_total)`: a single row regardless of how many
/// obras the workspace has, so the total is never cut by a row cap.
fn contract_total_query(workspace_id: WorkspaceId) -> Query {
    Query::table("obras")
        .select(format!("{CONTRACT_TOTAL}:valor_total.sum()"))
        .eq("workspace_id", workspace_id)
}

/// The sum is null when no obra carries a value.
fn contract_total(rows: &[Value]) -> f64 {
    rows.first()
        .and_then(|row| row.get(CONTRACT_TOTAL))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}
