//! Data access for the Engenha dashboard.
//!
//! The hosted backend is reached through the [`gateway`] seam; the
//! [`repositories`] translate dashboard intent into gateway queries and
//! commands scoped by workspace, and reshape responses into [`models`].

pub mod error;
pub mod gateway;
pub mod models;
pub mod repositories;

pub use error::RepoError;
pub use gateway::{AuthGateway, DataGateway, GatewayError, MemoryGateway, RestGateway, Session};
