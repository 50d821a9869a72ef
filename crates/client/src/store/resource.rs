//! Generic list store for workspace-scoped entities.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use engenha_core::error::CoreError;
use engenha_core::types::{EntityId, WorkspaceId};
use engenha_core::validation::Schema;
use engenha_db::models::Identified;
use engenha_db::{DataGateway, RepoError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::RequestSequence;
use crate::context::SessionContext;
use crate::error::ClientError;

/// An entity the dashboard lists and edits, bound to its repository.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Item: Identified + Clone + Send + Sync + 'static;
    type Filters: Clone + Default + PartialEq + Send + Sync + 'static;
    type Create: DeserializeOwned + Send + Sync + 'static;
    type Update: Send + Sync + 'static;

    /// Name used in logs and not-found errors.
    const NAME: &'static str;

    /// Form schema gating [`ResourceStore::create_from_form`].
    fn schema() -> Schema;

    async fn list(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        filters: &Self::Filters,
    ) -> Result<Vec<Self::Item>, RepoError>;

    async fn create(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        created_by: Option<EntityId>,
        input: &Self::Create,
    ) -> Result<Self::Item, RepoError>;

    async fn update(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
        input: &Self::Update,
    ) -> Result<Option<Self::Item>, RepoError>;

    async fn delete(
        gateway: &dyn DataGateway,
        workspace_id: WorkspaceId,
        id: EntityId,
    ) -> Result<bool, RepoError>;
}

/// What a list screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

struct StoreInner<R: Resource> {
    gateway: Arc<dyn DataGateway>,
    context: SessionContext,
    filters: watch::Sender<R::Filters>,
    state: watch::Sender<ResourceState<R::Item>>,
    sequence: RequestSequence,
    watching: AtomicBool,
}

/// List state for one resource within the current workspace.
///
/// Loads never return errors; failures land in [`ResourceState::error`].
/// Mutations call the backend first and patch local state only after it
/// confirms.
pub struct ResourceStore<R: Resource> {
    inner: Arc<StoreInner<R>>,
}

impl<R: Resource> Clone for ResourceStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(gateway: Arc<dyn DataGateway>, context: SessionContext) -> Self {
        Self::with_filters(gateway, context, R::Filters::default())
    }

    pub fn with_filters(
        gateway: Arc<dyn DataGateway>,
        context: SessionContext,
        filters: R::Filters,
    ) -> Self {
        let (filters, _) = watch::channel(filters);
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            inner: Arc::new(StoreInner {
                gateway,
                context,
                filters,
                state,
                sequence: RequestSequence::new(),
                watching: AtomicBool::new(false),
            }),
        }
    }

    pub fn snapshot(&self) -> ResourceState<R::Item> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<R::Item>> {
        self.inner.state.subscribe()
    }

    pub fn filters(&self) -> R::Filters {
        self.inner.filters.borrow().clone()
    }

    /// Load the list for the current workspace and filters.
    ///
    /// Without a workspace the store settles empty and the gateway is not
    /// contacted. Existing items stay visible while the request is in
    /// flight. A response is dropped if a newer load was issued meanwhile.
    pub async fn load(&self) {
        let inner = &self.inner;
        let token = inner.sequence.issue();

        let Some(workspace_id) = inner.context.workspace_id() else {
            inner.state.send_replace(ResourceState::default());
            return;
        };

        inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let filters = self.filters();
        tracing::debug!(resource = R::NAME, %workspace_id, token, "Loading list");
        let result = R::list(inner.gateway.as_ref(), workspace_id, &filters).await;

        // Checked under the state lock so a mutation confirmed meanwhile
        // cannot be overwritten by this response.
        let applied = inner.state.send_if_modified(|state| {
            if !inner.sequence.is_latest(token) {
                return false;
            }
            state.loading = false;
            match result {
                Ok(items) => state.items = items,
                Err(err) => {
                    tracing::error!(resource = R::NAME, error = %err, "Failed to load list");
                    state.error = Some(err.to_string());
                }
            }
            true
        });
        if !applied {
            tracing::warn!(resource = R::NAME, token, "Discarding superseded list response");
        }
    }

    pub async fn refetch(&self) {
        self.load().await;
    }

    /// Replace the list filters. Reloads when they differ from the current
    /// ones; a running watcher performs that reload instead.
    pub async fn set_filters(&self, filters: R::Filters) {
        let changed = self.inner.filters.send_if_modified(|current| {
            if *current == filters {
                return false;
            }
            *current = filters;
            true
        });
        if changed && !self.inner.watching.load(Ordering::SeqCst) {
            self.load().await;
        }
    }

    /// Start reloading whenever the workspace or the filters change.
    ///
    /// Performs an initial load. Each reload runs as its own task so a
    /// newer one supersedes an older one still in flight. Abort the
    /// returned handle to stop watching.
    pub fn spawn_watcher(&self) -> JoinHandle<()> {
        let store = self.clone();
        let mut session_rx = self.inner.context.subscribe();
        let mut filters_rx = self.inner.filters.subscribe();
        self.inner.watching.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let flag = WatchingFlag(store);
            let store = &flag.0;
            let mut workspace_id = session_rx.borrow_and_update().workspace_id;
            filters_rx.borrow_and_update();
            store.spawn_load();

            loop {
                tokio::select! {
                    changed = session_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let current = session_rx.borrow_and_update().workspace_id;
                        if current == workspace_id {
                            continue;
                        }
                        workspace_id = current;
                    }
                    changed = filters_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        filters_rx.borrow_and_update();
                    }
                }
                store.spawn_load();
            }
        })
    }

    fn spawn_load(&self) {
        let store = self.clone();
        tokio::spawn(async move { store.load().await });
    }

    fn workspace(&self) -> Result<WorkspaceId, ClientError> {
        self.inner
            .context
            .workspace_id()
            .ok_or_else(ClientError::no_workspace)
    }

    /// Create a record and put the confirmed row at the head of the list.
    pub async fn create(&self, input: R::Create) -> Result<R::Item, ClientError> {
        let workspace_id = self.workspace()?;
        let created_by = self.inner.context.user_id();
        let item = R::create(self.inner.gateway.as_ref(), workspace_id, created_by, &input).await?;

        tracing::info!(resource = R::NAME, id = %item.id(), "Record created");
        let confirmed = item.clone();
        self.apply_confirmed(|items| items.insert(0, confirmed));
        Ok(item)
    }

    /// Validate a raw form against the resource schema, then create.
    pub async fn create_from_form(&self, form: &Value) -> Result<R::Item, ClientError> {
        let input: R::Create = R::schema().parse(form)?;
        self.create(input).await
    }

    /// Update a record and replace it in place with the confirmed row.
    pub async fn update(&self, id: EntityId, input: R::Update) -> Result<R::Item, ClientError> {
        let workspace_id = self.workspace()?;
        let item = R::update(self.inner.gateway.as_ref(), workspace_id, id, &input)
            .await?
            .ok_or(CoreError::NotFound {
                entity: R::NAME,
                id,
            })?;

        let confirmed = item.clone();
        self.apply_confirmed(|items| {
            if let Some(slot) = items.iter_mut().find(|i| i.id() == id) {
                *slot = confirmed;
            }
        });
        Ok(item)
    }

    /// Delete a record remotely, then drop exactly that record locally.
    ///
    /// On failure the error is returned and the list is left untouched.
    pub async fn delete_by_id(&self, id: EntityId) -> Result<(), ClientError> {
        let workspace_id = self.workspace()?;
        let removed = R::delete(self.inner.gateway.as_ref(), workspace_id, id).await?;
        if !removed {
            tracing::debug!(resource = R::NAME, %id, "Delete matched no rows");
        }

        self.apply_confirmed(|items| items.retain(|item| item.id() != id));
        Ok(())
    }

    /// Patch the list with a server-confirmed change.
    ///
    /// A load still in flight read the table before the change, so it is
    /// superseded here and a fresh load replaces it.
    fn apply_confirmed(&self, patch: impl FnOnce(&mut Vec<R::Item>)) {
        let mut superseded = false;
        self.inner.state.send_modify(|state| {
            if state.loading {
                self.inner.sequence.issue();
                state.loading = false;
                superseded = true;
            }
            patch(&mut state.items);
        });
        if superseded {
            tracing::debug!(resource = R::NAME, "Replacing load superseded by a mutation");
            self.spawn_load();
        }
    }
}

/// Clears the watching flag when the watcher task ends or is aborted.
struct WatchingFlag<R: Resource>(ResourceStore<R>);

impl<R: Resource> Drop for WatchingFlag<R> {
    fn drop(&mut self) {
        self.0.inner.watching.store(false, Ordering::SeqCst);
    }
}
