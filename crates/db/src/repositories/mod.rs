//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&dyn DataGateway` as the first argument. Entity reads and
//! writes are always filtered by the caller's workspace id.

pub mod acervo_repo;
pub mod billing_repo;
pub mod dashboard_repo;
pub mod empresa_repo;
pub mod obra_repo;
pub mod plan_repo;
pub mod profile_repo;
pub mod subscription_repo;

pub use acervo_repo::AcervoRepo;
pub use billing_repo::BillingRepo;
pub use dashboard_repo::DashboardRepo;
pub use empresa_repo::EmpresaRepo;
pub use obra_repo::ObraRepo;
pub use plan_repo::PlanRepo;
pub use profile_repo::ProfileRepo;
pub use subscription_repo::SubscriptionRepo;

use engenha_core::types::{EntityId, WorkspaceId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::RepoError;
use crate::gateway::Filter;

// ---------------------------------------------------------------------------
// Shared row helpers
// ---------------------------------------------------------------------------

fn decode_row<T: DeserializeOwned>(entity: &'static str, row: Value) -> Result<T, RepoError> {
    serde_json::from_value(row).map_err(|source| RepoError::Decode { entity, source })
}

fn decode_rows<T: DeserializeOwned>(
    entity: &'static str,
    rows: Vec<Value>,
) -> Result<Vec<T>, RepoError> {
    rows.into_iter().map(|row| decode_row(entity, row)).collect()
}

/// Serialize a create DTO and stamp it with the owning workspace.
fn scoped_row(
    entity: &'static str,
    input: &impl Serialize,
    workspace_id: WorkspaceId,
) -> Result<Value, RepoError> {
    let mut row =
        serde_json::to_value(input).map_err(|source| RepoError::Decode { entity, source })?;
    if let Value::Object(object) = &mut row {
        object.insert(
            "workspace_id".to_string(),
            Value::String(workspace_id.to_string()),
        );
    }
    Ok(row)
}

/// Filters addressing one record inside one workspace.
fn by_id(workspace_id: WorkspaceId, id: EntityId) -> [Filter; 2] {
    [Filter::eq("id", id), Filter::eq("workspace_id", workspace_id)]
}

/// Wrap a search term for a case-insensitive substring match.
///
/// `%`, `_` and `\` in the term match literally. PostgREST reads `*` as `%`
/// and offers no escape for it, so a `*` matches any single character.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        match c {
            '%' | '_' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            '*' => pattern.push('_'),
            other => pattern.push(other),
        }
    }
    pattern.push('%');
    pattern
}
