//! Repository for the `obras` table.

use engenha_core::types::{EntityId, WorkspaceId};
use serde_json::Value;

use super::{by_id, contains_pattern, decode_row, decode_rows, scoped_row};
use crate::error::RepoError;
use crate::gateway::{DataGateway, Query};
use crate::models::obra::{CreateObra, Obra, ObraFilters, UpdateObra};

const TABLE: &str = "obras";
const ENTITY: &str = "Obra";

/// Provides CRUD operations for obras.
pub struct ObraRepo;

impl ObraRepo {
    /// List the workspace's obras, most recently created first.
    pub async fn list(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        filters: &ObraFilters,
    ) -> Result<Vec<Obra>, RepoError> {
        let mut query = Query::table(TABLE)
            .eq("workspace_id", workspace_id)
            .eq_opt("empresa_id", filters.empresa_id)
            .eq_opt("estado", filters.estado.as_deref())
            .order_by("created_at", false);
        if let Some(term) = filters.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.ilike("descricao_obra", contains_pattern(term));
        }

        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar obras"))?;
        decode_rows(ENTITY, rows)
    }

    pub async fn find_by_id(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<Option<Obra>, RepoError> {
        let query = Query::table(TABLE)
            .eq("id", id)
            .eq("workspace_id", workspace_id)
            .limit(1);
        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar obra"))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(ENTITY, row))
            .transpose()
    }

    /// Insert a new obra, returning the persisted row.
    ///
    /// `created_by` records the signed-in user, when known.
    pub async fn create(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        created_by: Option<EntityId>,
        input: &CreateObra,
    ) -> Result<Obra, RepoError> {
        let mut row = scoped_row(ENTITY, input, workspace_id)?;
        if let (Some(user_id), Value::Object(object)) = (created_by, &mut row) {
            object.insert("created_by".to_string(), Value::String(user_id.to_string()));
        }

        let created = gateway
            .insert(TABLE, row)
            .await
            .map_err(RepoError::context("Erro ao criar obra"))?;
        decode_row(ENTITY, created)
    }

    /// Update an obra. Only non-`None` fields in `input` are sent.
    ///
    /// Returns `None` if no row with the given `id` exists in the workspace.
    pub async fn update(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
        input: &UpdateObra,
    ) -> Result<Option<Obra>, RepoError> {
        let patch = serde_json::to_value(input)
            .map_err(|source| RepoError::Decode { entity: ENTITY, source })?;
        let rows = gateway
            .update(TABLE, &by_id(workspace_id, id), patch)
            .await
            .map_err(RepoError::context("Erro ao atualizar obra"))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(ENTITY, row))
            .transpose()
    }

    /// Delete an obra. Returns `true` if a row was removed.
    pub async fn delete(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<bool, RepoError> {
        let removed = gateway
            .delete(TABLE, &by_id(workspace_id, id))
            .await
            .map_err(RepoError::context("Erro ao excluir obra"))?;
        Ok(!removed.is_empty())
    }
}
