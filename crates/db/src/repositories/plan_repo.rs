//! Billing plans shown on the pricing page.

use super::decode_rows;
use crate::error::RepoError;
use crate::gateway::{DataGateway, Query};
use crate::models::plan::{Plan, PlanRecord};

const TABLE: &str = "plans";

pub struct PlanRepo;

impl PlanRepo {
    /// All plans in display order, reshaped for the pricing cards.
    ///
    /// Plans are global and not scoped by workspace.
    pub async fn list(gateway: &dyn DataGateway) -> Result<Vec<Plan>, RepoError> {
        let query = Query::table(TABLE).order_by("ordem", true);
        let rows = gateway
            .select(&query)
            .await
            .map_err(RepoError::context("Erro ao carregar planos"))?;
        let records: Vec<PlanRecord> = decode_rows("Plan", rows)?;
        Ok(records.into_iter().map(Plan::from).collect())
    }
}
