//! In-process gateway keeping tables as JSON rows.
//!
//! Evaluates the same [`Query`] model as the REST gateway, so repositories
//! and stores behave identically against it. Supports registered users,
//! registered server functions and per-table/per-function failure
//! injection, which makes it the backend of choice for tests and offline
//! demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{AuthGateway, AuthUser, DataGateway, Filter, GatewayError, Query, Session};

type FunctionHandler = Box<dyn Fn(&Value) -> Result<Value, GatewayError> + Send + Sync>;

const ACCESS_TOKEN_PREFIX: &str = "memory-access-";

struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    accounts: Mutex<Vec<Account>>,
    functions: Mutex<HashMap<String, FunctionHandler>>,
    failures: Mutex<HashMap<String, String>>,
    recoveries: Mutex<Vec<String>>,
    session: RwLock<Option<Session>>,
    require_confirmation: AtomicBool,
    data_calls: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows to a table as-is.
    pub async fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        self.tables
            .lock()
            .await
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Snapshot of a table's rows in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Register an account that can sign in with `email` / `password`.
    pub async fn register_user(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: Value::Object(Map::new()),
        };
        self.accounts.lock().await.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    /// Make sign-ups return no session until the e-mail is confirmed.
    pub fn require_email_confirmation(&self, required: bool) {
        self.require_confirmation.store(required, Ordering::SeqCst);
    }

    /// Register a server function handler.
    pub async fn register_function(
        &self,
        name: &str,
        handler: impl Fn(&Value) -> Result<Value, GatewayError> + Send + Sync + 'static,
    ) {
        self.functions
            .lock()
            .await
            .insert(name.to_string(), Box::new(handler));
    }

    /// Make every call touching `target` (a table or function name) fail
    /// with `message` until [`clear_failure`](Self::clear_failure).
    pub async fn fail(&self, target: &str, message: &str) {
        self.failures
            .lock()
            .await
            .insert(target.to_string(), message.to_string());
    }

    pub async fn clear_failure(&self, target: &str) {
        self.failures.lock().await.remove(target);
    }

    /// E-mails that requested a password recovery link.
    pub async fn recovery_requests(&self) -> Vec<String> {
        self.recoveries.lock().await.clone()
    }

    /// Number of table and function calls served so far.
    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }

    async fn begin(&self, target: &str) -> Result<(), GatewayError> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().await.get(target) {
            Some(message) => Err(GatewayError::api(400, message.clone())),
            None => Ok(()),
        }
    }

    fn session_for(user: &AuthUser) -> Session {
        Session {
            access_token: format!("{ACCESS_TOKEN_PREFIX}{}", user.id),
            refresh_token: format!("memory-refresh-{}", user.id),
            expires_in: Some(3600),
            token_type: "bearer".to_string(),
            user: user.clone(),
        }
    }
}

fn matches_all(filters: &[Filter], row: &Value) -> bool {
    filters.iter().all(|f| f.matches(row))
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, GatewayError> {
        self.begin(&query.table).await?;
        let tables = self.tables.lock().await;
        Ok(query.apply(tables.get(&query.table).into_iter().flatten()))
    }

    async fn count(&self, query: &Query) -> Result<u64, GatewayError> {
        self.begin(&query.table).await?;
        let tables = self.tables.lock().await;
        let count = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| matches_all(&query.filters, r)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        self.begin(table).await?;
        let Value::Object(mut object) = row else {
            return Err(GatewayError::api(400, "Row must be a JSON object"));
        };

        if object.get("id").map_or(true, Value::is_null) {
            object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        for column in ["created_at", "updated_at"] {
            if object.get(column).map_or(true, Value::is_null) {
                object.insert(column.to_string(), now());
            }
        }

        let row = Value::Object(object);
        self.tables
            .lock()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        self.begin(table).await?;
        let Value::Object(patch) = patch else {
            return Err(GatewayError::api(400, "Patch must be a JSON object"));
        };

        let mut tables = self.tables.lock().await;
        let mut updated = Vec::new();
        for row in tables.get_mut(table).into_iter().flatten() {
            if !matches_all(filters, row) {
                continue;
            }
            if let Value::Object(object) = row {
                for (key, value) in &patch {
                    object.insert(key.clone(), value.clone());
                }
                object.insert("updated_at".to_string(), now());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, GatewayError> {
        self.begin(table).await?;
        let mut tables = self.tables.lock().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| matches_all(filters, row));
        *rows = kept;
        Ok(removed)
    }

    async fn invoke(&self, function: &str, body: Value) -> Result<Value, GatewayError> {
        self.begin(function).await?;
        let functions = self.functions.lock().await;
        match functions.get(function) {
            Some(handler) => handler(&body),
            None => Err(GatewayError::api(
                404,
                format!("Function not found: {function}"),
            )),
        }
    }
}

#[async_trait]
impl AuthGateway for MemoryGateway {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, GatewayError> {
        let accounts = self.accounts.lock().await;
        let account = accounts
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .ok_or_else(|| GatewayError::Api {
                status: 400,
                code: Some("invalid_credentials".to_string()),
                message: "Invalid login credentials".to_string(),
            })?;

        let session = Self::session_for(&account.user);
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<Option<Session>, GatewayError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.iter().any(|a| a.user.email.as_deref() == Some(email)) {
            return Err(GatewayError::api(422, "User already registered"));
        }

        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: metadata,
        };
        accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });

        if self.require_confirmation.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let session = Self::session_for(&user);
        *self.session.write().await = Some(session.clone());
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        self.session.write().await.take();
        Ok(())
    }

    async fn recover_password(&self, email: &str, _redirect_to: &str) -> Result<(), GatewayError> {
        self.recoveries.lock().await.push(email.to_string());
        Ok(())
    }

    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, GatewayError> {
        let invalid = || GatewayError::api(401, "Token has expired or is invalid");
        let user_id = access_token
            .strip_prefix(ACCESS_TOKEN_PREFIX)
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(invalid)?;

        let accounts = self.accounts.lock().await;
        let account = accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .ok_or_else(invalid)?;

        let session = Session {
            refresh_token: refresh_token.to_string(),
            ..Self::session_for(&account.user)
        };
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }
}
