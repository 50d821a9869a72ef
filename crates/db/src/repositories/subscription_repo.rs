use engenha_core::types::WorkspaceId;

use super::decode_row;
use crate::error::RepoError;
use crate::gateway::{DataGateway, Query};
use crate::models::subscription::Subscription;

const TABLE: &str = "subscriptions";

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// The workspace's most recent subscription, if it ever had one.
    pub async fn current(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
    ) -> Result<Option<Subscription>, RepoError> {
        let query = Query::table(TABLE)
            .eq("workspace_id", workspace_id)
            .order_by("created_at", false)
            .limit(1);
        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar assinatura"))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row("Subscription", row))
            .transpose()
    }
}
