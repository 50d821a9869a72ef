//! Seam to the hosted backend-as-a-service.
//!
//! The backend exposes table-style CRUD endpoints, an auth service and
//! invokable server functions. [`DataGateway`] and [`AuthGateway`] describe
//! what the rest of the workspace needs from it; [`rest::RestGateway`]
//! talks to the real service over HTTP and [`memory::MemoryGateway`] keeps
//! everything in process.

pub mod memory;
pub mod query;
pub mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use memory::MemoryGateway;
pub use query::{Filter, FilterOp, Order, Query};
pub use rest::{GatewayConfig, RestGateway};

/// Errors from the remote data gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with an error payload. Displays the backend's
    /// own message so it can be fed to the error translator untouched.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A response body was not the JSON shape we expected.
    #[error("Unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A response was well-formed JSON but semantically unusable.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The operation needs an authenticated session and there is none.
    #[error("No active session")]
    NoSession,
}

impl GatewayError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Api {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            GatewayError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// The authenticated user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Table reads and writes plus server function calls.
///
/// Every call is a single independent request: no retries, no caching and
/// no transactions spanning calls.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Filtered read returning the matching rows.
    async fn select(&self, query: &Query) -> Result<Vec<Value>, GatewayError>;

    /// Number of rows matching the query's filters.
    async fn count(&self, query: &Query) -> Result<u64, GatewayError>;

    /// Insert one row, returning it as persisted.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError>;

    /// Patch every row matching `filters`, returning the updated rows.
    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError>;

    /// Delete every row matching `filters`, returning the removed rows.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, GatewayError>;

    /// Invoke a named server function with a JSON body.
    async fn invoke(&self, function: &str, body: Value) -> Result<Value, GatewayError>;
}

/// Session and account endpoints.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, GatewayError>;

    /// Create an account. Returns `None` when the backend requires e-mail
    /// confirmation before issuing a session.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<Option<Session>, GatewayError>;

    /// Revoke the current session and forget it locally.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Send a password recovery e-mail linking back to `redirect_to`.
    async fn recover_password(&self, email: &str, redirect_to: &str) -> Result<(), GatewayError>;

    /// Adopt tokens received out of band (e.g. from an auth callback link).
    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, GatewayError>;

    /// The current session, if any.
    async fn session(&self) -> Option<Session>;
}
