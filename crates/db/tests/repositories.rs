//! Integration tests for the repository layer.
//!
//! Exercises every repository against the in-process gateway:
//! - Workspace scoping of reads and writes
//! - Filters and ordering
//! - Dashboard aggregates
//! - Plan reshaping and billing functions

use assert_matches::assert_matches;
use chrono::NaiveDate;
use engenha_db::gateway::GatewayError;
use engenha_db::models::acervo::{AcervoFilters, CreateAcervoItem};
use engenha_db::models::empresa::{CreateEmpresa, UpdateEmpresa};
use engenha_db::models::obra::{CreateObra, ObraFilters, UpdateObra};
use engenha_db::models::subscription::SubscriptionStatus;
use engenha_db::repositories::billing_repo::{CheckoutRequest, CANCEL_PLAN_FUNCTION, CHECKOUT_FUNCTION};
use engenha_db::repositories::{
    AcervoRepo, BillingRepo, DashboardRepo, EmpresaRepo, ObraRepo, PlanRepo, ProfileRepo,
    SubscriptionRepo,
};
use engenha_db::{MemoryGateway, RepoError};
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_obra(descricao: &str, estado: &str, inicio: &str) -> CreateObra {
    CreateObra {
        empresa_id: None,
        engenheiro_id: None,
        descricao_obra: descricao.to_string(),
        finalidade_obra: None,
        observacoes: None,
        cidade: "Campinas".to_string(),
        estado: estado.to_string(),
        endereco_obra: None,
        data_inicio: NaiveDate::parse_from_str(inicio, "%Y-%m-%d").unwrap(),
        data_conclusao: None,
        contratante_nome: None,
        contratante_tipo: None,
        contratante_documento: None,
        numero_contrato: None,
        valor_total: None,
        is_public: None,
        categorias: None,
    }
}

fn new_empresa(nome: &str) -> CreateEmpresa {
    CreateEmpresa {
        nome: nome.to_string(),
        ..Default::default()
    }
}

fn new_documento(titulo: &str, tipo: &str, obra_id: Option<Uuid>) -> CreateAcervoItem {
    CreateAcervoItem {
        obra_id,
        titulo: titulo.to_string(),
        descricao: None,
        tipo_documento: tipo.to_string(),
        arquivo_url: None,
        tamanho_bytes: None,
    }
}

// ---------------------------------------------------------------------------
// Empresas
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empresa_crud_is_scoped_by_workspace() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    let other_ws = Uuid::new_v4();

    let beta = EmpresaRepo::create(&gw, ws, &new_empresa("Beta Engenharia")).await.unwrap();
    EmpresaRepo::create(&gw, ws, &new_empresa("Alfa Construções")).await.unwrap();
    EmpresaRepo::create(&gw, other_ws, &new_empresa("Gama")).await.unwrap();

    let listed = EmpresaRepo::list(&gw, ws).await.unwrap();
    let names: Vec<_> = listed.iter().map(|e| e.nome.as_str()).collect();
    assert_eq!(names, vec!["Alfa Construções", "Beta Engenharia"]);
    assert!(listed.iter().all(|e| e.workspace_id == ws));

    // Another workspace cannot see, update or delete the record.
    assert!(EmpresaRepo::find_by_id(&gw, other_ws, beta.id).await.unwrap().is_none());
    let patch = UpdateEmpresa {
        cidade: Some("Recife".to_string()),
        ..Default::default()
    };
    assert!(EmpresaRepo::update(&gw, other_ws, beta.id, &patch).await.unwrap().is_none());
    assert!(!EmpresaRepo::delete(&gw, other_ws, beta.id).await.unwrap());

    let updated = EmpresaRepo::update(&gw, ws, beta.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.cidade.as_deref(), Some("Recife"));
    assert_eq!(updated.nome, "Beta Engenharia");

    assert!(EmpresaRepo::delete(&gw, ws, beta.id).await.unwrap());
    assert_eq!(EmpresaRepo::list(&gw, ws).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reads_are_idempotent() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    ObraRepo::create(&gw, ws, None, &new_obra("Ponte", "PE", "2024-01-10")).await.unwrap();
    ObraRepo::create(&gw, ws, None, &new_obra("Escola", "SP", "2024-02-10")).await.unwrap();

    let filters = ObraFilters::default();
    let first = ObraRepo::list(&gw, ws, &filters).await.unwrap();
    let second = ObraRepo::list(&gw, ws, &filters).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn gateway_failure_carries_context_and_backend_message() {
    let gw = MemoryGateway::new();
    gw.fail("empresas", "permission denied for table empresas").await;

    let err = EmpresaRepo::list(&gw, Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, RepoError::Gateway { context: "Erro ao carregar empresas", .. });
    assert_eq!(
        err.gateway_message().as_deref(),
        Some("permission denied for table empresas")
    );
    assert_eq!(
        err.to_string(),
        "Erro ao carregar empresas: permission denied for table empresas"
    );
}

// ---------------------------------------------------------------------------
// Obras
// ---------------------------------------------------------------------------

#[tokio::test]
async fn obra_create_stamps_workspace_and_creator() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    let user = Uuid::new_v4();

    let obra = ObraRepo::create(&gw, ws, Some(user), &new_obra("Galpão", "MG", "2024-05-01"))
        .await
        .unwrap();
    assert_eq!(obra.workspace_id, ws);
    assert_eq!(obra.created_by, Some(user));
    assert!(obra.em_andamento());

    let stored = gw.rows("obras").await;
    assert_eq!(stored[0]["workspace_id"], json!(ws.to_string()));
}

#[tokio::test]
async fn obra_list_applies_filters() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    let empresa = EmpresaRepo::create(&gw, ws, &new_empresa("Alfa")).await.unwrap();

    let mut ponte = new_obra("Ponte sobre o rio Capibaribe", "PE", "2024-01-10");
    ponte.empresa_id = Some(empresa.id);
    ObraRepo::create(&gw, ws, None, &ponte).await.unwrap();
    ObraRepo::create(&gw, ws, None, &new_obra("Reforma de ponte", "SP", "2024-02-10"))
        .await
        .unwrap();
    ObraRepo::create(&gw, ws, None, &new_obra("Escola", "PE", "2024-03-10"))
        .await
        .unwrap();

    let by_estado = ObraFilters {
        estado: Some("PE".to_string()),
        ..Default::default()
    };
    assert_eq!(ObraRepo::list(&gw, ws, &by_estado).await.unwrap().len(), 2);

    let by_search = ObraFilters {
        search: Some("PONTE".to_string()),
        ..Default::default()
    };
    assert_eq!(ObraRepo::list(&gw, ws, &by_search).await.unwrap().len(), 2);

    let by_empresa = ObraFilters {
        empresa_id: Some(empresa.id),
        ..Default::default()
    };
    let listed = ObraRepo::list(&gw, ws, &by_empresa).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].descricao_obra, "Ponte sobre o rio Capibaribe");
}

#[tokio::test]
async fn obra_search_matches_wildcard_characters_literally() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    for descricao in ["Reforma 50% concluída", "Loteamento 500 casas", "Bloco_A"] {
        ObraRepo::create(&gw, ws, None, &new_obra(descricao, "SP", "2024-01-10"))
            .await
            .unwrap();
    }
    let search = |term: &str| ObraFilters {
        search: Some(term.to_string()),
        ..Default::default()
    };

    let percent = ObraRepo::list(&gw, ws, &search("50%")).await.unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].descricao_obra, "Reforma 50% concluída");

    // As a wildcard "a_5" would match "Reforma 50%".
    let underscore = ObraRepo::list(&gw, ws, &search("a_5")).await.unwrap();
    assert!(underscore.is_empty());
    let underscore = ObraRepo::list(&gw, ws, &search("co_a")).await.unwrap();
    assert_eq!(underscore.len(), 1);
}

#[tokio::test]
async fn obra_update_sends_only_provided_fields() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    let obra = ObraRepo::create(&gw, ws, None, &new_obra("Ponte", "PE", "2024-01-10"))
        .await
        .unwrap();

    let patch = UpdateObra {
        data_conclusao: NaiveDate::from_ymd_opt(2024, 9, 30),
        ..Default::default()
    };
    let updated = ObraRepo::update(&gw, ws, obra.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.descricao_obra, "Ponte");
    assert!(!updated.em_andamento());
}

// ---------------------------------------------------------------------------
// Acervo
// ---------------------------------------------------------------------------

#[tokio::test]
async fn acervo_filters_by_obra_type_and_title() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    let obra = ObraRepo::create(&gw, ws, None, &new_obra("Ponte", "PE", "2024-01-10"))
        .await
        .unwrap();

    AcervoRepo::create(&gw, ws, &new_documento("ART de execução", "art", Some(obra.id)))
        .await
        .unwrap();
    AcervoRepo::create(&gw, ws, &new_documento("Laudo estrutural", "laudo", Some(obra.id)))
        .await
        .unwrap();
    AcervoRepo::create(&gw, ws, &new_documento("Foto da fachada", "foto", None))
        .await
        .unwrap();

    let by_obra = AcervoFilters {
        obra_id: Some(obra.id),
        ..Default::default()
    };
    assert_eq!(AcervoRepo::list(&gw, ws, &by_obra).await.unwrap().len(), 2);

    let by_tipo = AcervoFilters {
        tipo_documento: Some("foto".to_string()),
        ..Default::default()
    };
    let fotos = AcervoRepo::list(&gw, ws, &by_tipo).await.unwrap();
    assert_eq!(fotos.len(), 1);
    assert_eq!(fotos[0].titulo, "Foto da fachada");

    let by_titulo = AcervoFilters {
        search: Some("estrutural".to_string()),
        ..Default::default()
    };
    assert_eq!(AcervoRepo::list(&gw, ws, &by_titulo).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_stats_aggregate_the_workspace() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();

    EmpresaRepo::create(&gw, ws, &new_empresa("Alfa")).await.unwrap();
    EmpresaRepo::create(&gw, Uuid::new_v4(), &new_empresa("Outra")).await.unwrap();

    let mut concluida = new_obra("Escola", "SP", "2023-01-10");
    concluida.data_conclusao = NaiveDate::from_ymd_opt(2023, 12, 1);
    concluida.valor_total = Some(100_000.0);
    ObraRepo::create(&gw, ws, None, &concluida).await.unwrap();

    let mut ponte = new_obra("Ponte", "PE", "2024-01-10");
    ponte.valor_total = Some(50_000.5);
    ObraRepo::create(&gw, ws, None, &ponte).await.unwrap();
    ObraRepo::create(&gw, ws, None, &new_obra("Galpão", "MG", "2024-02-10"))
        .await
        .unwrap();

    AcervoRepo::create(&gw, ws, &new_documento("ART", "art", None)).await.unwrap();

    let stats = DashboardRepo::stats(&gw, ws).await.unwrap();
    assert_eq!(stats.total_empresas, 1);
    assert_eq!(stats.total_obras, 3);
    assert_eq!(stats.obras_em_andamento, 2);
    assert_eq!(stats.obras_concluidas, 1);
    assert_eq!(stats.total_acervo, 1);
    assert_eq!(stats.valor_total_contratos, 150_000.5);
    assert_eq!(stats.recent_obras.len(), 3);
}

#[tokio::test]
async fn dashboard_contract_total_is_zero_without_valued_obras() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    ObraRepo::create(&gw, ws, None, &new_obra("Galpão", "MG", "2024-02-10"))
        .await
        .unwrap();

    let stats = DashboardRepo::stats(&gw, ws).await.unwrap();
    assert_eq!(stats.total_obras, 1);
    assert_eq!(stats.valor_total_contratos, 0.0);
}

#[tokio::test]
async fn dashboard_stats_fail_when_any_read_fails() {
    let gw = MemoryGateway::new();
    gw.fail("acervo", "connection reset").await;

    let err = DashboardRepo::stats(&gw, Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, RepoError::Gateway { context: "Erro ao contar acervo", .. });
}

// ---------------------------------------------------------------------------
// Plans, profiles and subscriptions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plans_are_ordered_and_reshaped() {
    let gw = MemoryGateway::new();
    gw.seed(
        "plans",
        [
            json!({"id": "pro", "nome": "Profissional", "preco_centavos": 19990,
                   "recursos": ["Obras ilimitadas", "Acervo completo"], "popular": true, "ordem": 2}),
            json!({"id": "basico", "nome": "Básico", "preco_centavos": 4990,
                   "recursos": ["Até 10 obras"], "ordem": 1}),
        ],
    )
    .await;

    let plans = PlanRepo::list(&gw).await.unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].id, "basico");
    assert_eq!(plans[0].price, "R$ 49,90");
    assert!(!plans[0].popular);
    assert_eq!(plans[1].name, "Profissional");
    assert_eq!(plans[1].price, "R$ 199,90");
    assert_eq!(plans[1].features, vec!["Obras ilimitadas", "Acervo completo"]);
    assert!(plans[1].popular);
}

#[tokio::test]
async fn profile_resolves_workspace() {
    let gw = MemoryGateway::new();
    let user = Uuid::new_v4();
    let orphan = Uuid::new_v4();
    let ws = Uuid::new_v4();
    gw.seed(
        "profiles",
        [
            json!({"id": user, "workspace_id": ws, "nome": "Maria"}),
            json!({"id": orphan, "workspace_id": null}),
        ],
    )
    .await;

    assert_eq!(ProfileRepo::resolve_workspace(&gw, user).await.unwrap(), Some(ws));
    assert_eq!(ProfileRepo::resolve_workspace(&gw, orphan).await.unwrap(), None);
    assert_eq!(ProfileRepo::resolve_workspace(&gw, Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn current_subscription_is_the_latest() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    gw.seed(
        "subscriptions",
        [
            json!({"workspace_id": ws, "plan_id": "basico", "status": "canceled",
                   "current_period_end": null, "created_at": "2024-01-01T00:00:00Z"}),
            json!({"workspace_id": ws, "plan_id": "pro", "status": "active",
                   "current_period_end": "2024-07-01T00:00:00Z", "created_at": "2024-06-01T00:00:00Z"}),
        ],
    )
    .await;

    let current = SubscriptionRepo::current(&gw, ws).await.unwrap().unwrap();
    assert_eq!(current.plan_id, "pro");
    assert!(current.is_active());
    assert!(SubscriptionRepo::current(&gw, Uuid::new_v4()).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkout_returns_redirect_url() {
    let gw = MemoryGateway::new();
    gw.register_function(CHECKOUT_FUNCTION, |body| {
        Ok(json!({ "url": format!("https://checkout.example/{}", body["plan_id"].as_str().unwrap_or("")) }))
    })
    .await;

    let request = CheckoutRequest {
        plan_id: "pro".to_string(),
        workspace_id: Uuid::new_v4(),
        success_url: "http://localhost:8080/dashboard?checkout=success".to_string(),
        cancel_url: "http://localhost:8080/planos".to_string(),
    };
    let url = BillingRepo::start_checkout(&gw, &request).await.unwrap();
    assert_eq!(url, "https://checkout.example/pro");
}

#[tokio::test]
async fn checkout_error_body_is_a_failure() {
    let gw = MemoryGateway::new();
    gw.register_function(CHECKOUT_FUNCTION, |_| Ok(json!({ "error": "Plano não encontrado" })))
        .await;

    let request = CheckoutRequest {
        plan_id: "inexistente".to_string(),
        workspace_id: Uuid::new_v4(),
        success_url: String::new(),
        cancel_url: String::new(),
    };
    let err = BillingRepo::start_checkout(&gw, &request).await.unwrap_err();
    assert_eq!(err.gateway_message().as_deref(), Some("Plano não encontrado"));
}

#[tokio::test]
async fn cancel_plan_returns_the_confirmed_subscription() {
    let gw = MemoryGateway::new();
    let ws = Uuid::new_v4();
    gw.register_function(CANCEL_PLAN_FUNCTION, |body| {
        Ok(json!({
            "subscription": {
                "workspace_id": body["workspace_id"],
                "plan_id": "pro",
                "status": "canceled",
                "current_period_end": "2024-07-01T00:00:00Z",
            }
        }))
    })
    .await;

    let subscription = BillingRepo::cancel_plan(&gw, ws).await.unwrap().unwrap();
    assert_eq!(subscription.workspace_id, ws);
    assert_eq!(subscription.status, SubscriptionStatus::Canceled);
    assert!(!subscription.is_active());
}

#[tokio::test]
async fn missing_function_surfaces_not_found() {
    let gw = MemoryGateway::new();
    let err = BillingRepo::cancel_plan(&gw, Uuid::new_v4()).await.unwrap_err();
    assert_matches!(
        err,
        RepoError::Gateway { source: GatewayError::Api { status: 404, .. }, .. }
    );
}
