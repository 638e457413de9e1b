//! Runtime settings for one invocation.
//!
//! Populated by the CLI layer, which merges command-line options over
//! `PGINIT_*` environment variables over the defaults here.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::connection_string::database_url_from_connection_string;

/// Fields dropped from entry/exit logs unless `debug` is set.
const REDACTED_FIELDS: &[&str] = &["database_url", "engine_configuration_json"];

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// URL of the PostgreSQL database to initialize.
    pub database_url: Option<String>,
    /// Full engine settings JSON supplied by the operator; overrides the
    /// constructed document.
    pub engine_configuration_json: Option<String>,
    /// file:// or http(s):// location of the schema SQL file.
    pub input_sql_url: Option<String>,
    /// Optional JSON template for the initial configuration payload.
    pub config_template: Option<PathBuf>,
    /// Engine support data directory.
    pub support_dir: PathBuf,
    /// Engine configuration directory.
    pub config_dir: PathBuf,
    /// Engine resource directory.
    pub resource_dir: PathBuf,
    /// Include secrets in entry/exit logs.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            engine_configuration_json: None,
            input_sql_url: None,
            config_template: None,
            support_dir: PathBuf::from("/opt/engine/data"),
            config_dir: PathBuf::from("/etc/opt/engine"),
            resource_dir: PathBuf::from("/opt/engine/resources"),
            debug: false,
        }
    }
}

impl Settings {
    /// JSON view for entry/exit logs. Credential-bearing fields are
    /// dropped unless `debug` is set.
    pub fn log_view(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_else(|_| json!({}));
        if !self.debug {
            if let Some(map) = value.as_object_mut() {
                for field in REDACTED_FIELDS {
                    map.remove(*field);
                }
            }
        }
        value
    }

    /// The mandatory task needs a schema source and at least one way to
    /// reach the database.
    pub fn validate_for_mandatory(&self) -> Result<()> {
        if self.input_sql_url.as_deref().unwrap_or("").is_empty() {
            bail!("missing required parameter: PGINIT_INPUT_SQL_URL");
        }
        if self.database_url.as_deref().unwrap_or("").is_empty()
            && self
                .engine_configuration_json
                .as_deref()
                .unwrap_or("")
                .is_empty()
        {
            bail!(
                "missing required parameter: either PGINIT_DATABASE_URL \
                 or PGINIT_ENGINE_CONFIGURATION_JSON"
            );
        }
        Ok(())
    }

    /// Every database URL the schema should be applied to: the configured
    /// URL plus the connection recorded in the engine settings JSON,
    /// deduplicated.
    pub fn target_database_urls(&self) -> Result<Vec<String>> {
        let mut urls = BTreeSet::new();

        if let Some(url) = &self.database_url {
            if !url.is_empty() {
                urls.insert(url.clone());
            }
        }

        if let Some(engine_json) = &self.engine_configuration_json {
            if !engine_json.is_empty() {
                let doc: serde_json::Value = serde_json::from_str(engine_json)
                    .context("PGINIT_ENGINE_CONFIGURATION_JSON is not valid JSON")?;
                if let Some(connection) = doc.pointer("/SQL/CONNECTION").and_then(|v| v.as_str()) {
                    urls.insert(database_url_from_connection_string(connection));
                }
            }
        }

        Ok(urls.into_iter().collect())
    }

    /// The database that hosts the configuration store: the configured
    /// URL, else the engine settings connection.
    pub fn primary_database_url(&self) -> Result<Option<String>> {
        if let Some(url) = &self.database_url {
            if !url.is_empty() {
                return Ok(Some(url.clone()));
            }
        }
        Ok(self.target_database_urls()?.into_iter().next())
    }
}
