//! Idempotent default-configuration initialization.
//!
//! The store is the source of truth for "already initialized": every run
//! starts by asking it for the current default. A run that fails part-way
//! (payload built but not registered, or registered but not set default)
//! leaves no state this code needs to repair; the next run re-checks the
//! store and proceeds from there. Two processes racing on an empty store
//! may both create a configuration; resolving that is the store's job.

use std::fmt;

use thiserror::Error;

use crate::config_store::{ConfigBuilder, ConfigStore};

/// Comment recorded on the configuration created by first initialization.
const INITIAL_CONFIG_COMMENT: &str = "Initial configuration.";

/// Which store call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStep {
    GetDefaultConfigId,
    AddConfig,
    SetDefaultConfigId,
}

impl fmt::Display for StoreStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreStep::GetDefaultConfigId => "get_default_config_id",
            StoreStep::AddConfig => "add_config",
            StoreStep::SetDefaultConfigId => "set_default_config_id",
        })
    }
}

/// Initialization failure. Fatal to the enclosing initialization task;
/// there is no safe partial-success state to continue from.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration store call {step} failed: {source}")]
    Store {
        step: StoreStep,
        #[source]
        source: anyhow::Error,
    },
    #[error("building the initial configuration payload failed: {source}")]
    Builder {
        #[source]
        source: anyhow::Error,
    },
}

/// Ensures the store designates a default configuration, creating one from
/// the builder when none exists.
pub struct ConfigInitializer<'a, S, B> {
    store: &'a S,
    builder: &'a B,
}

impl<'a, S, B> ConfigInitializer<'a, S, B>
where
    S: ConfigStore + Sync,
    B: ConfigBuilder + Sync,
{
    pub fn new(store: &'a S, builder: &'a B) -> Self {
        Self { store, builder }
    }

    /// Returns the id of a newly created default configuration, or `None`
    /// when the store already had one. Re-running against an initialized
    /// store is a no-op.
    pub async fn ensure_default_config(&self) -> Result<Option<String>, InitError> {
        let existing = self.store.default_config_id().await.map_err(|source| {
            InitError::Store {
                step: StoreStep::GetDefaultConfigId,
                source,
            }
        })?;

        if let Some(id) = existing {
            tracing::info!(config_id = %id, "default configuration already exists");
            return Ok(None);
        }

        let handle = self
            .builder
            .create_empty_config()
            .await
            .map_err(|source| InitError::Builder { source })?;
        let payload = self
            .builder
            .serialize(&handle)
            .await
            .map_err(|source| InitError::Builder { source })?;
        self.builder
            .release(handle)
            .await
            .map_err(|source| InitError::Builder { source })?;

        let new_id = self
            .store
            .add_config(&payload, INITIAL_CONFIG_COMMENT)
            .await
            .map_err(|source| InitError::Store {
                step: StoreStep::AddConfig,
                source,
            })?;

        self.store
            .set_default_config_id(&new_id)
            .await
            .map_err(|source| InitError::Store {
                step: StoreStep::SetDefaultConfigId,
                source,
            })?;

        Ok(Some(new_id))
    }
}
