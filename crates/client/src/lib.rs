//! Client SDK for the Engenha dashboard.
//!
//! Wires the [`engenha_db`] gateway and repositories into observable
//! stores, an explicit [`context::SessionContext`] and the auth flows.

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod store;

pub use client::EngenhaClient;
pub use config::ClientConfig;
pub use context::SessionContext;
pub use error::ClientError;
