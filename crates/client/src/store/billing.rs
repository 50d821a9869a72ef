//! Plans, the workspace subscription and the payment flows.

use std::sync::Arc;

use engenha_core::error::CoreError;
use engenha_db::models::plan::Plan;
use engenha_db::models::subscription::{Subscription, SubscriptionStatus};
use engenha_db::repositories::billing_repo::CheckoutRequest;
use engenha_db::repositories::{BillingRepo, PlanRepo, SubscriptionRepo};
use engenha_db::DataGateway;
use tokio::sync::watch;

use super::{RequestSequence, ValueState};
use crate::context::SessionContext;
use crate::error::ClientError;

/// What the plans page renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingOverview {
    pub plans: Vec<Plan>,
    /// `None` when signed out or the workspace never subscribed.
    pub subscription: Option<Subscription>,
}

struct BillingInner {
    gateway: Arc<dyn DataGateway>,
    context: SessionContext,
    site_url: String,
    state: watch::Sender<ValueState<BillingOverview>>,
    sequence: RequestSequence,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BillingStore {
    inner: Arc<BillingInner>,
}

impl BillingStore {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        context: SessionContext,
        site_url: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(ValueState::default());
        Self {
            inner: Arc::new(BillingInner {
                gateway,
                context,
                site_url: site_url.into(),
                state,
                sequence: RequestSequence::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> ValueState<BillingOverview> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ValueState<BillingOverview>> {
        self.inner.state.subscribe()
    }

    /// Load the plans and, inside a workspace, its subscription.
    pub async fn load(&self) {
        let inner = &self.inner;
        let token = inner.sequence.issue();
        let workspace_id = inner.context.workspace_id();

        inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let gateway = inner.gateway.as_ref();
        let result = futures::try_join!(PlanRepo::list(gateway), async {
            match workspace_id {
                Some(ws) => SubscriptionRepo::current(gateway, ws).await,
                None => Ok(None),
            }
        });

        let applied = inner.state.send_if_modified(|state| {
            if !inner.sequence.is_latest(token) {
                return false;
            }
            state.loading = false;
            match result {
                Ok((plans, subscription)) => {
                    state.value = Some(BillingOverview {
                        plans,
                        subscription,
                    })
                }
                Err(err) => {
                    tracing::error!(error = %err, "Failed to load billing overview");
                    state.error = Some(err.to_string());
                }
            }
            true
        });
        if !applied {
            tracing::warn!(token, "Discarding superseded billing response");
        }
    }

    /// Start a checkout for `plan_id` and return the URL to navigate to.
    ///
    /// Requires a signed-in session; fails before any network call
    /// otherwise.
    pub async fn start_checkout(&self, plan_id: &str) -> Result<String, ClientError> {
        if !self.inner.context.is_authenticated() {
            return Err(CoreError::Precondition(
                "Faça login para assinar um plano.".to_string(),
            )
            .into());
        }
        let workspace_id = self
            .inner
            .context
            .workspace_id()
            .ok_or_else(ClientError::no_workspace)?;

        let request = CheckoutRequest {
            plan_id: plan_id.to_string(),
            workspace_id,
            success_url: format!("{}/dashboard?checkout=success", self.inner.site_url),
            cancel_url: format!("{}/planos", self.inner.site_url),
        };
        Ok(BillingRepo::start_checkout(self.inner.gateway.as_ref(), &request).await?)
    }

    /// Cancel the workspace plan and apply the confirmed subscription
    /// locally. When the server does not echo the subscription back, the
    /// known one is marked canceled.
    pub async fn cancel_plan(&self) -> Result<Option<Subscription>, ClientError> {
        if !self.inner.context.is_authenticated() {
            return Err(CoreError::Precondition(
                "Faça login para gerenciar sua assinatura.".to_string(),
            )
            .into());
        }
        let workspace_id = self
            .inner
            .context
            .workspace_id()
            .ok_or_else(ClientError::no_workspace)?;

        let confirmed = BillingRepo::cancel_plan(self.inner.gateway.as_ref(), workspace_id).await?;

        let mut applied = None;
        let mut superseded = false;
        self.inner.state.send_modify(|state| {
            // A load in flight read the subscription before cancellation.
            if state.loading {
                self.inner.sequence.issue();
                state.loading = false;
                superseded = true;
            }
            let overview = state.value.get_or_insert_with(BillingOverview::default);
            match &confirmed {
                Some(subscription) => overview.subscription = Some(subscription.clone()),
                None => {
                    if let Some(subscription) = overview.subscription.as_mut() {
                        subscription.status = SubscriptionStatus::Canceled;
                    }
                }
            }
            applied = overview.subscription.clone();
        });

        if superseded {
            tracing::debug!("Replacing billing load superseded by cancellation");
            let store = self.clone();
            tokio::spawn(async move { store.load().await });
        }
        Ok(applied)
    }
}
