//! Integration tests for the resource stores.
//!
//! Covers the list-state contract shared by every entity store:
//! - No workspace means no gateway call and an empty, settled list
//! - Deletes remove exactly the confirmed record, failures change nothing
//! - Stale responses never overwrite fresher state
//! - Existing items stay visible while a reload is in flight

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use engenha_client::store::{EmpresaStore, ObraStore, ResourceState};
use engenha_client::{ClientError, SessionContext};
use engenha_core::error::CoreError;
use engenha_db::models::obra::{Obra, ObraFilters, UpdateObra};
use engenha_db::{DataGateway, MemoryGateway};
use serde_json::json;
use uuid::Uuid;

use common::{empresa_row, obra_row, signed_in, wait_until, GatedGateway};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seeded_obras(gw: &MemoryGateway, workspace_id: Uuid) {
    gw.seed(
        "obras",
        [
            obra_row(workspace_id, "Ponte", "2024-01-01T00:00:00Z"),
            obra_row(workspace_id, "Escola", "2024-02-01T00:00:00Z"),
            obra_row(workspace_id, "Galpão", "2024-03-01T00:00:00Z"),
        ],
    )
    .await;
}

fn names(state: &ResourceState<Obra>) -> Vec<&str> {
    state.items.iter().map(|o| o.descricao_obra.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_workspace_settles_empty_without_contacting_gateway() {
    let gw = Arc::new(MemoryGateway::new());
    seeded_obras(&gw, Uuid::new_v4()).await;
    let store = ObraStore::new(gw.clone(), signed_in(None));

    store.load().await;

    assert_eq!(store.snapshot(), ResourceState::default());
    assert_eq!(gw.data_calls(), 0);
}

#[tokio::test]
async fn signed_out_context_behaves_like_no_workspace() {
    let gw = Arc::new(MemoryGateway::new());
    let store = EmpresaStore::new(gw.clone(), SessionContext::new());

    store.refetch().await;

    let state = store.snapshot();
    assert!(state.items.is_empty());
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(gw.data_calls(), 0);
}

#[tokio::test]
async fn loads_workspace_items_newest_first() {
    let gw = Arc::new(MemoryGateway::new());
    let ws = Uuid::new_v4();
    seeded_obras(&gw, ws).await;
    seeded_obras(&gw, Uuid::new_v4()).await;
    let store = ObraStore::new(gw.clone(), signed_in(Some(ws)));

    store.load().await;
    let first = store.snapshot();
    assert_eq!(names(&first), vec!["Galpão", "Escola", "Ponte"]);
    assert!(!first.loading);

    store.refetch().await;
    assert_eq!(store.snapshot(), first);
}

#[tokio::test]
async fn load_failure_is_stored_not_returned() {
    let gw = Arc::new(MemoryGateway::new());
    gw.fail("empresas", "permission denied for table empresas").await;
    let store = EmpresaStore::new(gw.clone(), signed_in(Some(Uuid::new_v4())));

    store.load().await;

    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(
        state.error.as_deref(),
        Some("Erro ao carregar empresas: permission denied for table empresas")
    );
}

#[tokio::test]
async fn changed_filters_reload_and_equal_filters_do_not() {
    let gw = Arc::new(MemoryGateway::new());
    let ws = Uuid::new_v4();
    seeded_obras(&gw, ws).await;
    let store = ObraStore::new(gw.clone(), signed_in(Some(ws)));
    store.load().await;
    let calls = gw.data_calls();

    store.set_filters(ObraFilters::default()).await;
    assert_eq!(gw.data_calls(), calls);

    store
        .set_filters(ObraFilters {
            search: Some("esc".to_string()),
            ..Default::default()
        })
        .await;
    assert_eq!(gw.data_calls(), calls + 1);
    assert_eq!(names(&store.snapshot()), vec!["Escola"]);
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_exactly_the_confirmed_record() {
    let gw = Arc::new(MemoryGateway::new());
    let ws = Uuid::new_v4();
    seeded_obras(&gw, ws).await;
    let store = ObraStore::new(gw.clone(), signed_in(Some(ws)));
    store.load().await;

    let target = store.snapshot().items[1].id;
    store.delete_by_id(target).await.unwrap();

    let state = store.snapshot();
    assert_eq!(names(&state), vec!["Galpão", "Ponte"]);
    assert!(state.items.iter().all(|o| o.id != target));
    assert_eq!(gw.rows("obras").await.len(), 2);
}

#[tokio::test]
async fn failed_delete_leaves_items_unchanged() {
    let gw = Arc::new(MemoryGateway::new());
    let ws = Uuid::new_v4();
    seeded_obras(&gw, ws).await;
    let store = ObraStore::new(gw.clone(), signed_in(Some(ws)));
    store.load().await;
    let before = store.snapshot();

    gw.fail("obras", "violates foreign key constraint").await;
    let err = store.delete_by_id(before.items[0].id).await.unwrap_err();

    assert_matches!(err, ClientError::Repo(_));
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn delete_without_workspace_is_a_precondition_failure() {
    let gw = Arc::new(MemoryGateway::new());
    let store = ObraStore::new(gw.clone(), signed_in(None));

    let err = store.delete_by_id(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Precondition(_)));
    assert_eq!(gw.data_calls(), 0);
}

#[tokio::test]
async fn create_from_form_validates_then_prepends_confirmed_record() {
    let gw = Arc::new(MemoryGateway::new());
    let ws = Uuid::new_v4();
    seeded_obras(&gw, ws).await;
    let context = signed_in(Some(ws));
    let store = ObraStore::new(gw.clone(), context.clone());
    store.load().await;
    let calls = gw.data_calls();

    let invalid = json!({
        "descricao_obra": "ab",
        "cidade": "SP",
        "estado": "SP",
        "data_inicio": "2024-01-01",
    });
    let err = store.create_from_form(&invalid).await.unwrap_err();
    assert_matches!(err, ClientError::Validation(ref errors) if errors.fields() == vec!["descricao_obra"]);
    assert_eq!(gw.data_calls(), calls);

    let valid = json!({
        "descricao_obra": "Reforma do hospital",
        "cidade": "Sorocaba",
        "estado": "SP",
        "data_inicio": "2024-04-01",
        "valor_total": 320000,
        "numero_contrato": "",
    });
    let created = store.create_from_form(&valid).await.unwrap();
    assert_eq!(created.workspace_id, ws);
    assert_eq!(created.created_by, context.user_id());
    assert!(created.numero_contrato.is_none());

    let state = store.snapshot();
    assert_eq!(state.items.len(), 4);
    assert_eq!(state.items[0].id, created.id);
}

#[tokio::test]
async fn update_replaces_the_record_in_place() {
    let gw = Arc::new(MemoryGateway::new());
    let ws = Uuid::new_v4();
    seeded_obras(&gw, ws).await;
    let store = ObraStore::new(gw.clone(), signed_in(Some(ws)));
    store.load().await;

    let target = store.snapshot().items[1].id;
    let patch = UpdateObra {
        descricao_obra: Some("Escola estadual".to_string()),
        ..Default::default()
    };
    store.update(target, patch).await.unwrap();

    assert_eq!(names(&store.snapshot()), vec!["Galpão", "Escola estadual", "Ponte"]);

    let missing = store.update(Uuid::new_v4(), UpdateObra::default()).await;
    assert_matches!(missing, Err(ClientError::Core(CoreError::NotFound { entity: "Obra", .. })));
}

#[tokio::test]
async fn empresa_store_lists_by_name() {
    let gw = Arc::new(MemoryGateway::new());
    let ws = Uuid::new_v4();
    gw.seed("empresas", [empresa_row(ws, "Beta"), empresa_row(ws, "Alfa")]).await;
    let store = EmpresaStore::new(gw.clone(), signed_in(Some(ws)));

    store.load().await;

    let nomes: Vec<_> = store.snapshot().items.into_iter().map(|e| e.nome).collect();
    assert_eq!(nomes, vec!["Alfa", "Beta"]);
}

// ---------------------------------------------------------------------------
// Ordering of concurrent loads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stale_response_never_overwrites_fresher_state() {
    let gw = GatedGateway::new();
    let ws_old = Uuid::new_v4();
    let ws_new = Uuid::new_v4();
    gw.inner.seed("obras", [obra_row(ws_old, "Antiga", "2024-01-01T00:00:00Z")]).await;
    gw.inner.seed("obras", [obra_row(ws_new, "Nova", "2024-01-01T00:00:00Z")]).await;

    let context = signed_in(Some(ws_old));
    let data: Arc<dyn DataGateway> = gw.clone();
    let store = ObraStore::new(data, context.clone());

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    gw.wait_for_pending(1).await;

    context.switch_workspace(Some(ws_new));
    let second = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    gw.wait_for_pending(2).await;

    // The newer request answers first.
    gw.release(1).await;
    second.await.unwrap();
    assert_eq!(names(&store.snapshot()), vec!["Nova"]);

    // The older one arrives late and must be dropped.
    gw.release(0).await;
    first.await.unwrap();
    let state = store.snapshot();
    assert_eq!(names(&state), vec!["Nova"]);
    assert!(!state.loading);
}

#[tokio::test]
async fn delete_supersedes_a_list_load_already_in_flight() {
    let gw = GatedGateway::new();
    let ws = Uuid::new_v4();
    gw.inner
        .seed(
            "obras",
            [
                obra_row(ws, "Ponte", "2024-01-01T00:00:00Z"),
                obra_row(ws, "Escola", "2024-02-01T00:00:00Z"),
            ],
        )
        .await;
    let data: Arc<dyn DataGateway> = gw.clone();
    let store = ObraStore::new(data, signed_in(Some(ws)));
    let mut rx = store.subscribe();

    let initial = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    gw.wait_for_pending(1).await;
    gw.release(0).await;
    initial.await.unwrap();
    let target = store.snapshot().items[0].id;

    // This reload read the table while the target still existed.
    let reload = tokio::spawn({
        let store = store.clone();
        async move { store.refetch().await }
    });
    gw.wait_for_pending(2).await;

    store.delete_by_id(target).await.unwrap();
    assert!(store.snapshot().items.iter().all(|o| o.id != target));

    // The delete schedules a replacement load.
    gw.wait_for_pending(3).await;

    gw.release(1).await;
    reload.await.unwrap();
    assert!(store.snapshot().items.iter().all(|o| o.id != target));

    gw.release(2).await;
    let state = wait_until(&mut rx, |s| !s.loading).await;
    assert_eq!(names(&state), vec!["Ponte"]);
    assert_eq!(gw.inner.rows("obras").await.len(), 1);
}

#[tokio::test]
async fn create_during_in_flight_load_keeps_the_new_record() {
    let gw = GatedGateway::new();
    let ws = Uuid::new_v4();
    gw.inner.seed("obras", [obra_row(ws, "Ponte", "2024-01-01T00:00:00Z")]).await;
    let data: Arc<dyn DataGateway> = gw.clone();
    let store = ObraStore::new(data, signed_in(Some(ws)));
    let mut rx = store.subscribe();

    let stale = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    gw.wait_for_pending(1).await;

    let created = store
        .create_from_form(&json!({
            "descricao_obra": "Viaduto norte",
            "cidade": "Campinas",
            "estado": "SP",
            "data_inicio": "2024-05-01",
        }))
        .await
        .unwrap();
    gw.wait_for_pending(2).await;

    gw.release(0).await;
    stale.await.unwrap();
    assert!(store.snapshot().items.iter().any(|o| o.id == created.id));

    gw.release(1).await;
    let state = wait_until(&mut rx, |s| !s.loading).await;
    assert_eq!(state.items.len(), 2);
    assert!(state.items.iter().any(|o| o.id == created.id));
}

#[tokio::test]
async fn reload_keeps_items_and_clears_error_while_in_flight() {
    let gw = GatedGateway::new();
    let ws = Uuid::new_v4();
    gw.inner
        .seed(
            "obras",
            [
                obra_row(ws, "Ponte", "2024-01-01T00:00:00Z"),
                obra_row(ws, "Escola", "2024-02-01T00:00:00Z"),
            ],
        )
        .await;
    let data: Arc<dyn DataGateway> = gw.clone();
    let store = ObraStore::new(data, signed_in(Some(ws)));

    let load = |store: ObraStore| tokio::spawn(async move { store.load().await });

    // Initial load.
    let task = load(store.clone());
    gw.wait_for_pending(1).await;
    gw.release(0).await;
    task.await.unwrap();
    assert_eq!(store.snapshot().items.len(), 2);

    // A failed reload keeps the items and records the error.
    gw.inner.fail("obras", "connection reset").await;
    let task = load(store.clone());
    gw.wait_for_pending(2).await;
    gw.release(1).await;
    task.await.unwrap();
    let failed = store.snapshot();
    assert_eq!(failed.items.len(), 2);
    assert!(failed.error.is_some());

    // While the next reload is in flight: old items, loading, no error.
    gw.inner.clear_failure("obras").await;
    let task = load(store.clone());
    gw.wait_for_pending(3).await;
    let pending = store.snapshot();
    assert!(pending.loading);
    assert!(pending.error.is_none());
    assert_eq!(pending.items.len(), 2);

    gw.release(2).await;
    task.await.unwrap();
    let settled = store.snapshot();
    assert!(!settled.loading);
    assert!(settled.error.is_none());
}

// ---------------------------------------------------------------------------
// Watcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn watcher_follows_workspace_and_filter_changes() {
    let gw = Arc::new(MemoryGateway::new());
    let ws_a = Uuid::new_v4();
    let ws_b = Uuid::new_v4();
    seeded_obras(&gw, ws_a).await;
    gw.seed("obras", [obra_row(ws_b, "Viaduto", "2024-01-01T00:00:00Z")]).await;

    let context = signed_in(Some(ws_a));
    let store = ObraStore::new(gw.clone(), context.clone());
    let mut rx = store.subscribe();
    let watcher = store.spawn_watcher();

    wait_until(&mut rx, |s| s.items.len() == 3 && !s.loading).await;

    context.switch_workspace(Some(ws_b));
    let state = wait_until(&mut rx, |s| s.items.len() == 1 && !s.loading).await;
    assert_eq!(names(&state), vec!["Viaduto"]);

    context.switch_workspace(Some(ws_a));
    wait_until(&mut rx, |s| s.items.len() == 3 && !s.loading).await;

    store
        .set_filters(ObraFilters {
            search: Some("ponte".to_string()),
            ..Default::default()
        })
        .await;
    let state = wait_until(&mut rx, |s| s.items.len() == 1 && !s.loading).await;
    assert_eq!(names(&state), vec!["Ponte"]);

    context.clear();
    wait_until(&mut rx, |s| s.items.is_empty() && !s.loading).await;

    watcher.abort();
}
