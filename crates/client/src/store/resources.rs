//! Bindings of the dashboard entities to their repositories.

use async_trait::async_trait;
use engenha_core::types::{EntityId, WorkspaceId};
use engenha_core::validation::schemas::{acervo_schema, empresa_schema, obra_schema};
use engenha_core::validation::Schema;
use engenha_db::models::acervo::{AcervoFilters, AcervoItem, CreateAcervoItem, UpdateAcervoItem};
use engenha_db::models::empresa::{CreateEmpresa, Empresa, EmpresaFilters, UpdateEmpresa};
use engenha_db::models::obra::{CreateObra, Obra, ObraFilters, UpdateObra};
use engenha_db::repositories::{AcervoRepo, EmpresaRepo, ObraRepo};
use engenha_db::{DataGateway, RepoError};

use super::resource::{Resource, ResourceStore};

pub type EmpresaStore = ResourceStore<Empresas>;
pub type ObraStore = ResourceStore<Obras>;
pub type AcervoStore = ResourceStore<Acervo>;

// ---------------------------------------------------------------------------
// Empresas
// ---------------------------------------------------------------------------

pub struct Empresas;

#[async_trait]
impl Resource for Empresas {
    type Item = Empresa;
    type Filters = EmpresaFilters;
    type Create = CreateEmpresa;
    type Update = UpdateEmpresa;

    const NAME: &'static str = "Empresa";

    fn schema() -> Schema {
        empresa_schema()
    }

    async fn list(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        _filters: &EmpresaFilters,
    ) -> Result<Vec<Empresa>, RepoError> {
        EmpresaRepo::list(gateway, workspace_id).await
    }

    async fn create(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        _created_by: Option<EntityId>,
        input: &CreateEmpresa,
    ) -> Result<Empresa, RepoError> {
        EmpresaRepo::create(gateway, workspace_id, input).await
    }

    async fn update(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
        input: &UpdateEmpresa,
    ) -> Result<Option<Empresa>, RepoError> {
        EmpresaRepo::update(gateway, workspace_id, id, input).await
    }

    async fn delete(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<bool, RepoError> {
        EmpresaRepo::delete(gateway, workspace_id, id).await
    }
}

// ---------------------------------------------------------------------------
// Obras
// ---------------------------------------------------------------------------

pub struct Obras;

#[async_trait]
impl Resource for Obras {
    type Item = Obra;
    type Filters = ObraFilters;
    type Create = CreateObra;
    type Update = UpdateObra;

    const NAME: &'static str = "Obra";

    fn schema() -> Schema {
        obra_schema()
    }

    async fn list(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        filters: &ObraFilters,
    ) -> Result<Vec<Obra>, RepoError> {
        ObraRepo::list(gateway, workspace_id, filters).await
    }

    async fn create(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        created_by: Option<EntityId>,
        input: &CreateObra,
    ) -> Result<Obra, RepoError> {
        ObraRepo::create(gateway, workspace_id, created_by, input).await
    }

    async fn update(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
        input: &UpdateObra,
    ) -> Result<Option<Obra>, RepoError> {
        ObraRepo::update(gateway, workspace_id, id, input).await
    }

    async fn delete(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<bool, RepoError> {
        ObraRepo::delete(gateway, workspace_id, id).await
    }
}

// ---------------------------------------------------------------------------
// Acervo
// ---------------------------------------------------------------------------

pub struct Acervo;

#[async_trait]
impl Resource for Acervo {
    type Item = AcervoItem;
    type Filters = AcervoFilters;
    type Create = CreateAcervoItem;
    type Update = UpdateAcervoItem;

    const NAME: &'static str = "AcervoItem";

    fn schema() -> Schema {
        acervo_schema()
    }

    async fn list(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        filters: &AcervoFilters,
    ) -> Result<Vec<AcervoItem>, RepoError> {
        AcervoRepo::list(gateway, workspace_id, filters).await
    }

    async fn create(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        _created_by: Option<EntityId>,
        input: &CreateAcervoItem,
    ) -> Result<AcervoItem, RepoError> {
        AcervoRepo::create(gateway, workspace_id, input).await
    }

    async fn update(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
        input: &UpdateAcervoItem,
    ) -> Result<Option<AcervoItem>, RepoError> {
        AcervoRepo::update(gateway, workspace_id, id, input).await
    }

    async fn delete(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<bool, RepoError> {
        AcervoRepo::delete(gateway, workspace_id, id).await
    }
}
