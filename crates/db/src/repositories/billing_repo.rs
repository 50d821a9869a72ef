//! Payment flows backed by server functions.

use engenha_core::types::WorkspaceId;
use serde::Serialize;
use serde_json::{json, Value};

use super::decode_row;
use crate::error::RepoError;
use crate::gateway::{DataGateway, GatewayError};
use crate::models::subscription::Subscription;

pub const CHECKOUT_FUNCTION: &str = "stripe-checkout";
pub const CANCEL_PLAN_FUNCTION: &str = "cancel-plan";

/// Body of the checkout function call.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub plan_id: String,
    pub workspace_id: WorkspaceId,
    pub success_url: String,
    pub cancel_url: String,
}

pub struct BillingRepo;

impl BillingRepo {
    /// Create a checkout session and return the URL the user must be sent to.
    pub async fn start_checkout(
        gateway: &dyn DataGateway,
        request: &CheckoutRequest,
    ) -> Result<String, RepoError> {
        const CONTEXT: &str = "Erro ao iniciar pagamento";

        let body = serde_json::to_value(request)
            .map_err(|source| RepoError::Decode { entity: "CheckoutRequest", source })?;
        let response = gateway
            .invoke(CHECKOUT_FUNCTION, body)
            .await
            .and_then(reject_error_body)
            .map_err(RepoError::context(CONTEXT))?;

        let url = response
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| RepoError::Gateway {
                context: CONTEXT,
                source: GatewayError::UnexpectedResponse("checkout returned no url".into()),
            })?;

        tracing::info!(plan_id = %request.plan_id, "Checkout session created");
        Ok(url.to_string())
    }

    /// Cancel the workspace's plan. Returns the subscription as the server
    /// left it, or `None` when the function does not echo one back.
    pub async fn cancel_plan(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
    ) -> Result<Option<Subscription>, RepoError> {
        let response = gateway
            .invoke(CANCEL_PLAN_FUNCTION, json!({ "workspace_id": workspace_id }))
            .await
            .and_then(reject_error_body)
            .map_err(RepoError::context("Erro ao cancelar plano"))?;

        tracing::info!(%workspace_id, "Plan cancelled");
        match response.get("subscription") {
            Some(row) if !row.is_null() => decode_row("Subscription", row.clone()).map(Some),
            _ => Ok(None),
        }
    }
}

/// Server functions may answer 200 with `{"error": "..."}`.
fn reject_error_body(body: Value) -> Result<Value, GatewayError> {
    match body.get("error").and_then(Value::as_str) {
        Some(message) => Err(GatewayError::api(400, message)),
        None => Ok(body),
    }
}
