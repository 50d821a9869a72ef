//! Repository for the `empresas` table.

use engenha_core::types::{EntityId, WorkspaceId};

use super::{by_id, decode_row, decode_rows, scoped_row};
use crate::error::RepoError;
use crate::gateway::{DataGateway, Query};
use crate::models::empresa::{CreateEmpresa, Empresa, UpdateEmpresa};

const TABLE: &str = "empresas";
const ENTITY: &str = "Empresa";

/// Provides CRUD operations for empresas.
pub struct EmpresaRepo;

impl EmpresaRepo {
    /// List the workspace's empresas alphabetically.
    pub async fn list(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
    ) -> Result<Vec<Empresa>, RepoError> {
        let query = Query::table(TABLE)
            .eq("workspace_id", workspace_id)
            .order_by("nome", true);
        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar empresas"))?;
        decode_rows(ENTITY, rows)
    }

    pub async fn find_by_id(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<Option<Empresa>, RepoError> {
        let query = Query::table(TABLE)
            .eq("id", id)
            .eq("workspace_id", workspace_id)
            .limit(1);
        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar empresa"))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(ENTITY, row))
            .transpose()
    }

    /// Insert a new empresa, returning the persisted row.
    pub async fn create(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        input: &CreateEmpresa,
    ) -> Result<Empresa, RepoError> {
        let row = scoped_row(ENTITY, input, workspace_id)?;
        let created = gateway
            .insert(TABLE, row)
            .await
            .map_err(RepoError::context("Erro ao criar empresa"))?;
        decode_row(ENTITY, created)
    }

    /// Update an empresa. Only non-`None` fields in `input` are sent.
    ///
    /// Returns `None` if no row with the given `id` exists in the workspace.
    pub async fn update(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
        input: &UpdateEmpresa,
    ) -> Result<Option<Empresa>, RepoError> {
        let patch = serde_json::to_value(input)
            .map_err(|source| RepoError::Decode { entity: ENTITY, source })?;
        let rows = gateway
            .update(TABLE, &by_id(workspace_id, id), patch)
            .await
            .map_err(RepoError::context("Erro ao atualizar empresa"))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(ENTITY, row))
            .transpose()
    }

    /// Delete an empresa. Returns `true` if a row was removed.
    pub async fn delete(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<bool, RepoError> {
        let removed = gateway
            .delete(TABLE, &by_id(workspace_id, id))
            .await
            .map_err(RepoError::context("Erro ao excluir empresa"))?;
        Ok(!removed.is_empty())
    }
}
