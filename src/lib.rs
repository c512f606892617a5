//! Nexus Repository Manager provider plugin core.
//!
//! This crate implements the provider's domain model, per-format adapters,
//! schema composition, and the reconciliation engine that drives repository
//! lifecycles against the Nexus REST API. The plugin transport layer sits
//! outside this crate and calls into [`provider::Provider`].

#[macro_use]
mod macros;

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod models;
pub mod moved;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod telemetry;

pub use config::ProviderConfig;
pub use error::{ProviderError, Result};
pub use provider::Provider;
