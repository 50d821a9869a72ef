//! One-stop wiring of the gateway, context, stores and flows.

use std::sync::Arc;

use engenha_db::{AuthGateway, DataGateway, RepoError, RestGateway};
use serde_json::{json, Value};

use crate::auth::AuthService;
use crate::config::{ClientConfig, DEFAULT_SITE_URL};
use crate::context::SessionContext;
use crate::error::ClientError;
use crate::store::{AcervoStore, BillingStore, DashboardStore, EmpresaStore, ObraStore};

/// Everything a dashboard session needs, sharing one gateway and one
/// [`SessionContext`].
pub struct EngenhaClient {
    pub context: SessionContext,
    pub auth: AuthService,
    pub empresas: EmpresaStore,
    pub obras: ObraStore,
    pub acervo: AcervoStore,
    pub dashboard: DashboardStore,
    pub billing: BillingStore,
}

impl EngenhaClient {
    /// Connect to the hosted backend described by `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let gateway = RestGateway::new(&config.gateway_config()).map_err(|err| {
            ClientError::Repo(RepoError::Gateway {
                context: "Erro ao configurar cliente",
                source: err,
            })
        })?;
        let mut client = Self::with_gateway(Arc::new(gateway), &config.site_url);
        client.auth = client.auth.with_redirect_delay(config.auth_redirect_delay);
        Ok(client)
    }

    /// Build on any gateway implementing both seams.
    pub fn with_gateway<G>(gateway: Arc<G>, site_url: &str) -> Self
    where
        G: DataGateway + AuthGateway + 'static,
    {
        let context = SessionContext::new();
        let data: Arc<dyn DataGateway> = gateway.clone();
        let auth: Arc<dyn AuthGateway> = gateway;

        Self {
            auth: AuthService::new(auth, data.clone(), context.clone()).with_site_url(site_url),
            empresas: EmpresaStore::new(data.clone(), context.clone()),
            obras: ObraStore::new(data.clone(), context.clone()),
            acervo: AcervoStore::new(data.clone(), context.clone()),
            dashboard: DashboardStore::new(data.clone(), context.clone()),
            billing: BillingStore::new(data, context.clone(), site_url),
            context,
        }
    }

    /// JSON overview of the dashboard, billing and obras stores as they
    /// stand, with every stored load error collected under `errors`.
    pub fn summary(&self) -> Value {
        let dashboard = self.dashboard.snapshot();
        let billing = self.billing.snapshot();
        let obras = self.obras.snapshot();

        let errors: Vec<String> = [dashboard.error, billing.error, obras.error]
            .into_iter()
            .flatten()
            .collect();
        let (plans, subscription) = match billing.value {
            Some(overview) => (Some(overview.plans), overview.subscription),
            None => (None, None),
        };

        json!({
            "workspace_id": self.context.workspace_id(),
            "dashboard": dashboard.value,
            "plans": plans,
            "subscription": subscription,
            "obras": obras.items,
            "errors": errors,
        })
    }
}

impl<G> From<Arc<G>> for EngenhaClient
where
    G: DataGateway + AuthGateway + 'static,
{
    fn from(gateway: Arc<G>) -> Self {
        Self::with_gateway(gateway, DEFAULT_SITE_URL)
    }
}
