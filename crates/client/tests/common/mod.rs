#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use engenha_db::gateway::{AuthUser, Filter, Query};
use engenha_client::SessionContext;
use engenha_db::{DataGateway, GatewayError, MemoryGateway, Session};
use serde_json::{json, Value};
use tokio::sync::{oneshot, watch, Mutex};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn session_for(user_id: Uuid) -> Session {
    Session {
        access_token: format!("test-access-{user_id}"),
        refresh_token: "test-refresh".to_string(),
        expires_in: Some(3600),
        token_type: "bearer".to_string(),
        user: AuthUser {
            id: user_id,
            email: Some("maria@obra.com".to_string()),
            user_metadata: json!({}),
        },
    }
}

/// A context signed in as a fresh user, optionally inside a workspace.
pub fn signed_in(workspace_id: Option<Uuid>) -> SessionContext {
    let context = SessionContext::new();
    context.establish(session_for(Uuid::new_v4()), workspace_id);
    context
}

pub fn empresa_row(workspace_id: Uuid, nome: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "workspace_id": workspace_id,
        "nome": nome,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
    })
}

pub fn obra_row(workspace_id: Uuid, descricao: &str, created_at: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "workspace_id": workspace_id,
        "descricao_obra": descricao,
        "cidade": "Campinas",
        "estado": "SP",
        "data_inicio": "2024-01-01",
        "created_at": created_at,
        "updated_at": created_at,
    })
}

/// Wait (bounded) until the published state satisfies `predicate`.
pub async fn wait_until<T: Clone>(rx: &mut watch::Receiver<T>, predicate: impl Fn(&T) -> bool) -> T {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let current = rx.borrow_and_update();
                if predicate(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("store dropped");
        }
    })
    .await
    .expect("state never reached the expected shape")
}

// ---------------------------------------------------------------------------
// GatedGateway
// ---------------------------------------------------------------------------

/// Wraps a [`MemoryGateway`] and holds every `select` and `count` response
/// until the test releases it, so the order in which responses arrive can
/// be controlled. The read happens before the gate: a held response
/// reflects the table as it was when the request arrived.
pub struct GatedGateway {
    pub inner: MemoryGateway,
    gates: Mutex<Vec<Option<oneshot::Sender<()>>>>,
    entered: watch::Sender<usize>,
}

impl GatedGateway {
    pub fn new() -> Arc<Self> {
        let (entered, _) = watch::channel(0);
        Arc::new(Self {
            inner: MemoryGateway::new(),
            gates: Mutex::new(Vec::new()),
            entered,
        })
    }

    /// Wait until `count` selects are parked at their gates.
    pub async fn wait_for_pending(&self, count: usize) {
        let mut rx = self.entered.subscribe();
        while *rx.borrow_and_update() < count {
            rx.changed().await.expect("gateway dropped");
        }
    }

    /// Let the `index`-th held read (0-based, in arrival order) proceed.
    pub async fn release(&self, index: usize) {
        let gate = self.gates.lock().await[index]
            .take()
            .expect("gate already released");
        gate.send(()).expect("read no longer waiting");
    }

    /// Release every held read in `range`.
    pub async fn release_all(&self, range: std::ops::Range<usize>) {
        for index in range {
            self.release(index).await;
        }
    }

    async fn hold(&self) {
        let (tx, rx) = oneshot::channel();
        {
            let mut gates = self.gates.lock().await;
            gates.push(Some(tx));
            self.entered.send_replace(gates.len());
        }
        let _ = rx.await;
    }
}

#[async_trait]
impl DataGateway for GatedGateway {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, GatewayError> {
        let rows = self.inner.select(query).await;
        self.hold().await;
        rows
    }

    async fn count(&self, query: &Query) -> Result<u64, GatewayError> {
        let total = self.inner.count(query).await;
        self.hold().await;
        total
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        self.inner.insert(table, row).await
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        self.inner.update(table, filters, patch).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, GatewayError> {
        self.inner.delete(table, filters).await
    }

    async fn invoke(&self, function: &str, body: Value) -> Result<Value, GatewayError> {
        self.inner.invoke(function, body).await
    }
}
