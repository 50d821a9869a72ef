//! HTTP client for the hosted backend (PostgREST tables, auth service and
//! edge functions) using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{AuthGateway, AuthUser, DataGateway, Filter, GatewayError, Query, Session};

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_EXACT_COUNT: &str = "count=exact";

/// Connection settings for [`RestGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    pub timeout: Duration,
}

/// Gateway backed by the hosted service's REST endpoints.
///
/// Holds the current session so table and function calls are made on
/// behalf of the signed-in user; without a session the anon key is used.
pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl RestGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        let apikey = HeaderValue::from_str(&config.anon_key).map_err(|_| {
            GatewayError::UnexpectedResponse("anon key is not a valid header value".into())
        })?;
        headers.insert("apikey", apikey);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing [`reqwest::Client`]. The client must already send
    /// the `apikey` header.
    pub fn with_client(client: reqwest::Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    /// Attach the bearer token of the current session, or the anon key.
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.read().await.as_ref() {
            Some(session) => request.bearer_auth(&session.access_token),
            None => request.bearer_auth(&self.anon_key),
        }
    }

    async fn store_session(&self, session: &Session) {
        *self.session.write().await = Some(session.clone());
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, turning the backend's
    /// error payload into [`GatewayError::Api`] otherwise.
    async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let (code, message) = parse_error_payload(&body);
        let message = message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or(body)
        });

        tracing::debug!(status = status.as_u16(), ?code, %message, "Gateway request failed");
        Err(GatewayError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// Parse a successful JSON body, tolerating empty bodies as `null`.
    async fn parse_json(response: Response) -> Result<Value, GatewayError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn parse_rows(response: Response) -> Result<Vec<Value>, GatewayError> {
        match Self::parse_json(response).await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }
}

/// Pull `(code, message)` out of the various error shapes the backend uses:
/// PostgREST (`message`, `code`), auth (`msg` / `error_description`,
/// `error_code`) and functions (`error`).
fn parse_error_payload(body: &str) -> (Option<String>, Option<String>) {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return (None, None);
    };

    let message = ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    let code = ["code", "error_code"]
        .iter()
        .find_map(|key| match map.get(*key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });

    (code, message)
}

/// Read the total from a `Content-Range: 0-24/3573` (or `*/0`) header.
fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_param).collect()
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, GatewayError> {
        let request = self
            .client
            .get(self.rest_url(&query.table))
            .query(&query.to_params());
        let response = self.authorize(request).await.send().await?;
        Self::parse_rows(response).await
    }

    async fn count(&self, query: &Query) -> Result<u64, GatewayError> {
        let mut params = query.to_params();
        params.retain(|(key, _)| key != "order" && key != "limit");

        let request = self
            .client
            .head(self.rest_url(&query.table))
            .header("Prefer", PREFER_EXACT_COUNT)
            .query(&params);
        let response = self.authorize(request).await.send().await?;
        let response = Self::ensure_success(response).await?;

        response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing Content-Range total".into()))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        let request = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&row);
        let response = self.authorize(request).await.send().await?;
        Self::parse_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::UnexpectedResponse(format!("insert into {table} returned no rows")))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        let request = self
            .client
            .patch(self.rest_url(table))
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&filter_params(filters))
            .json(&patch);
        let response = self.authorize(request).await.send().await?;
        Self::parse_rows(response).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, GatewayError> {
        let request = self
            .client
            .delete(self.rest_url(table))
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&filter_params(filters));
        let response = self.authorize(request).await.send().await?;
        Self::parse_rows(response).await
    }

    async fn invoke(&self, function: &str, body: Value) -> Result<Value, GatewayError> {
        let request = self.client.post(self.function_url(function)).json(&body);
        let response = self.authorize(request).await.send().await?;
        Self::parse_json(response).await
    }
}

#[async_trait]
impl AuthGateway for RestGateway {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, GatewayError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session: Session = serde_json::from_value(Self::parse_json(response).await?)?;
        self.store_session(&session).await;
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<Option<Session>, GatewayError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        let body = Self::parse_json(response).await?;

        if body.get("access_token").is_none() {
            return Ok(None);
        }
        let session: Session = serde_json::from_value(body)?;
        self.store_session(&session).await;
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };
        let response = self
            .client
            .post(self.auth_url("logout"))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn recover_password(&self, email: &str, redirect_to: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.auth_url("recover"))
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, GatewayError> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .bearer_auth(access_token)
            .send()
            .await?;
        let user: AuthUser = serde_json::from_value(Self::parse_json(response).await?)?;

        let session = Session {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_in: None,
            token_type: "bearer".to_string(),
            user,
        };
        self.store_session(&session).await;
        Ok(session)
    }

    async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }
}
