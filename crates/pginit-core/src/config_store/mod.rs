//! Configuration store and builder collaborator boundaries.
//!
//! The engine keeps its configuration catalog in the target database; the
//! initializer only talks to these traits. Store-specific failures stay
//! opaque (`anyhow`) and gain step attribution in
//! [`crate::initializer::InitError`].

mod postgres;
mod template;

pub use postgres::PgConfigStore;
pub use template::TemplateConfigBuilder;

use anyhow::Result;
use async_trait::async_trait;

/// External configuration store: holds configuration records and the
/// pointer naming which one is the default.
#[async_trait]
pub trait ConfigStore {
    /// Identifier of the current default configuration, if one is set.
    async fn default_config_id(&self) -> Result<Option<String>>;

    /// Register a configuration payload; returns the new identifier.
    async fn add_config(&self, payload: &str, comment: &str) -> Result<String>;

    /// Point the store's default at an existing configuration.
    async fn set_default_config_id(&self, id: &str) -> Result<()>;
}

/// Produces the configuration payload registered on first initialization.
#[async_trait]
pub trait ConfigBuilder {
    type Handle: Send + Sync;

    /// Create a fresh, empty configuration.
    async fn create_empty_config(&self) -> Result<Self::Handle>;

    /// Serialize a configuration to its JSON payload.
    async fn serialize(&self, handle: &Self::Handle) -> Result<String>;

    /// Release a configuration handle.
    async fn release(&self, handle: Self::Handle) -> Result<()>;
}
