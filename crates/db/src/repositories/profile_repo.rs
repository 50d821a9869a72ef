use engenha_core::types::{EntityId, WorkspaceId};

use super::decode_row;
use crate::error::RepoError;
use crate::gateway::{DataGateway, Query};
use crate::models::profile::Profile;

const TABLE: &str = "profiles";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find(
        gateway: &dyn DataGateway,
        user_id: EntityId,
    ) -> Result<Option<Profile>, RepoError> {
        let query = Query::table(TABLE).eq("id", user_id).limit(1);
        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar perfil"))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row("Profile", row))
            .transpose()
    }

    /// The workspace the user belongs to. `None` when the user has no
    /// profile yet or the profile is not attached to a workspace.
    pub async fn resolve_workspace(
        gateway: &dyn DataGateway,
        user_id: EntityId,
    ) -> Result<Option<WorkspaceId>, RepoError> {
        Ok(Self::find(gateway, user_id)
            .await?
            .and_then(|profile| profile.workspace_id))
    }
}
