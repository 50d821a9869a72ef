//! Repository for the `acervo` table.

use engenha_core::types::{EntityId, WorkspaceId};

use super::{by_id, contains_pattern, decode_row, decode_rows, scoped_row};
use crate::error::RepoError;
use crate::gateway::{DataGateway, Query};
use crate::models::acervo::{AcervoFilters, AcervoItem, CreateAcervoItem, UpdateAcervoItem};

const TABLE: &str = "acervo";
const ENTITY: &str = "AcervoItem";

/// Provides CRUD operations for the document collection.
pub struct AcervoRepo;

impl AcervoRepo {
    /// List the workspace's acervo items, newest first.
    pub async fn list(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        filters: &AcervoFilters,
    ) -> Result<Vec<AcervoItem>, RepoError> {
        let mut query = Query::table(TABLE)
            .eq("workspace_id", workspace_id)
            .eq_opt("obra_id", filters.obra_id)
            .eq_opt("tipo_documento", filters.tipo_documento.as_deref())
            .order_by("created_at", false);
        if let Some(term) = filters.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.ilike("titulo", contains_pattern(term));
        }

        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar acervo"))?;
        decode_rows(ENTITY, rows)
    }

    pub async fn find_by_id(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<Option<AcervoItem>, RepoError> {
        let query = Query::table(TABLE)
            .eq("id", id)
            .eq("workspace_id", workspace_id)
            .limit(1);
        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar documento"))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(ENTITY, row))
            .transpose()
    }

    pub async fn create(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        input: &CreateAcervoItem,
    ) -> Result<AcervoItem, RepoError> {
        let row = scoped_row(ENTITY, input, workspace_id)?;
        let created = gateway
            .insert(TABLE, row)
            .await
            .map_err(RepoError::context("Erro ao adicionar documento"))?;
        decode_row(ENTITY, created)
    }

    pub async fn update(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
        input: &UpdateAcervoItem,
    ) -> Result<Option<AcervoItem>, RepoError> {
        let patch = serde_json::to_value(input)
            .map_err(|source| RepoError::Decode { entity: ENTITY, source })?;
        let rows = gateway
            .update(TABLE, &by_id(workspace_id, id), patch)
            .await
            .map_err(RepoError::context("Erro ao atualizar documento"))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(ENTITY, row))
            .transpose()
    }

    pub async fn delete(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<bool, RepoError> {
        let removed = gateway
            .delete(TABLE, &by_id(workspace_id, id))
            .await
            .map_err(RepoError::context("Erro ao excluir documento"))?;
        Ok(!removed.is_empty())
    }
}
