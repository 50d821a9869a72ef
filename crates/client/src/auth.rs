//! Sign-in, sign-up, sign-out, password recovery and the auth callback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use engenha_core::error_messages::translate_error;
use engenha_core::types::WorkspaceId;
use engenha_core::validation::schemas::{password_reset_schema, sign_in_schema, sign_up_schema};
use engenha_db::repositories::ProfileRepo;
use engenha_db::{AuthGateway, DataGateway, Session};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{DEFAULT_AUTH_REDIRECT_DELAY_MS, DEFAULT_SITE_URL};
use crate::context::SessionContext;
use crate::error::ClientError;

const INVALID_LINK: &str = "Link de autenticação inválido ou expirado.";

/// Where the user is sent after an auth flow completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    ResetPassword,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::ResetPassword => "/redefinir-senha",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn,
    /// The account exists but the e-mail must be confirmed first.
    ConfirmationPending,
}

#[derive(Debug, Deserialize)]
struct SignInForm {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SignUpForm {
    nome: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct PasswordResetForm {
    email: String,
}

pub struct AuthService {
    auth: Arc<dyn AuthGateway>,
    data: Arc<dyn DataGateway>,
    context: SessionContext,
    site_url: String,
    redirect_delay: Duration,
}

impl AuthService {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        data: Arc<dyn DataGateway>,
        context: SessionContext,
    ) -> Self {
        Self {
            auth,
            data,
            context,
            site_url: DEFAULT_SITE_URL.to_string(),
            redirect_delay: Duration::from_millis(DEFAULT_AUTH_REDIRECT_DELAY_MS),
        }
    }

    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Validate the sign-in form, authenticate and establish the context.
    pub async fn sign_in(&self, form: &Value) -> Result<Session, ClientError> {
        let form: SignInForm = sign_in_schema().parse(form)?;

        let session = self
            .auth
            .sign_in_with_password(form.email.trim(), &form.password)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Sign-in rejected");
                ClientError::auth(&err)
            })?;

        self.adopt(session.clone()).await?;
        Ok(session)
    }

    /// Validate the sign-up form and create the account.
    pub async fn sign_up(&self, form: &Value) -> Result<SignUpOutcome, ClientError> {
        let form: SignUpForm = sign_up_schema().parse(form)?;

        let metadata = json!({ "nome": form.nome.trim() });
        let session = self
            .auth
            .sign_up(form.email.trim(), &form.password, metadata)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Sign-up rejected");
                ClientError::auth(&err)
            })?;

        match session {
            Some(session) => {
                self.adopt(session).await?;
                Ok(SignUpOutcome::SignedIn)
            }
            None => {
                tracing::info!("Sign-up awaiting e-mail confirmation");
                Ok(SignUpOutcome::ConfirmationPending)
            }
        }
    }

    /// Sign out remotely and tear down the context. A remote failure is
    /// logged; the local session is cleared regardless.
    pub async fn sign_out(&self) {
        if let Err(err) = self.auth.sign_out().await {
            tracing::warn!(error = %err, "Remote sign-out failed");
        }
        self.context.clear();
    }

    /// Send the password recovery e-mail.
    pub async fn request_password_reset(&self, form: &Value) -> Result<(), ClientError> {
        let form: PasswordResetForm = password_reset_schema().parse(form)?;
        let redirect_to = format!("{}{}", self.site_url, Route::ResetPassword.path());

        self.auth
            .recover_password(form.email.trim(), &redirect_to)
            .await
            .map_err(|err| ClientError::auth(&err))?;
        tracing::info!("Password recovery requested");
        Ok(())
    }

    /// Complete an auth redirect: read the tokens from the URL fragment,
    /// adopt the session, wait the redirect delay and return where to go.
    pub async fn handle_callback(&self, url: &str) -> Result<Route, ClientError> {
        let params = fragment_params(url).ok_or_else(|| ClientError::Auth(INVALID_LINK.into()))?;

        if let Some(description) = params.get("error_description") {
            tracing::warn!(%description, "Auth callback carried an error");
            return Err(ClientError::Auth(translate_error(description)));
        }

        let (Some(access_token), Some(refresh_token)) =
            (params.get("access_token"), params.get("refresh_token"))
        else {
            return Err(ClientError::Auth(INVALID_LINK.into()));
        };

        let session = self
            .auth
            .set_session(access_token, refresh_token)
            .await
            .map_err(|err| ClientError::auth(&err))?;
        self.adopt(session).await?;

        let route = match params.get("type").map(String::as_str) {
            Some("recovery") => Route::ResetPassword,
            _ => Route::Dashboard,
        };

        tokio::time::sleep(self.redirect_delay).await;
        tracing::info!(route = route.path(), "Auth callback completed");
        Ok(route)
    }

    /// Resolve the user's workspace and establish the context. If the
    /// profile cannot be read the gateway session is revoked, so the gateway
    /// and the context never disagree about who is signed in.
    async fn adopt(&self, session: Session) -> Result<Option<WorkspaceId>, ClientError> {
        let workspace_id =
            match ProfileRepo::resolve_workspace(self.data.as_ref(), session.user.id).await {
                Ok(workspace_id) => workspace_id,
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        user_id = %session.user.id,
                        "Failed to resolve workspace"
                    );
                    if let Err(sign_out) = self.auth.sign_out().await {
                        tracing::warn!(error = %sign_out, "Remote sign-out failed");
                    }
                    return Err(err.into());
                }
            };
        self.context.establish(session, workspace_id);
        Ok(workspace_id)
    }
}

/// Decode the `#key=value&...` fragment of a callback URL.
fn fragment_params(url: &str) -> Option<HashMap<String, String>> {
    let parsed = Url::parse(url).ok()?;
    let fragment = parsed.fragment().filter(|f| !f.is_empty())?.to_string();

    let mut decoder = parsed;
    decoder.set_query(Some(&fragment));
    Some(
        decoder
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
    )
}
