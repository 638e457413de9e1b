//! `pginit mandatory` – apply the schema SQL and ensure a default engine
//! configuration exists. Idempotent; safe to run repeatedly.

use std::time::Instant;

use anyhow::{Context, Result};

use pginit_core::config_store::{PgConfigStore, TemplateConfigBuilder};
use pginit_core::connection_string::driver_parameters;
use pginit_core::db_url::parse_database_url;
use pginit_core::engine_settings;
use pginit_core::initializer::ConfigInitializer;
use pginit_core::settings::Settings;
use pginit_core::sql;

pub async fn run_mandatory(settings: &Settings) -> Result<()> {
    settings.validate_for_mandatory()?;

    let entry = Instant::now();
    tracing::info!(settings = %settings.log_view(), "enter mandatory");

    process_sql_file(settings).await?;
    update_engine_configuration(settings).await?;

    tracing::info!(
        elapsed_seconds = entry.elapsed().as_secs_f64(),
        "exit mandatory"
    );
    Ok(())
}

/// Apply the schema SQL to every target database.
async fn process_sql_file(settings: &Settings) -> Result<()> {
    let input_sql_url = settings
        .input_sql_url
        .clone()
        .context("missing required parameter: PGINIT_INPUT_SQL_URL")?;
    let statements = sql::load_statements(&input_sql_url).await?;
    tracing::info!(
        count = statements.len(),
        source = %input_sql_url,
        "loaded SQL statements"
    );

    for url in settings.target_database_urls()? {
        let parsed = parse_database_url(&url)?;
        let params = driver_parameters(&parsed);
        let report = sql::apply_statements(&params, &statements).await?;
        tracing::info!(
            host = %params.host,
            dbname = %params.dbname,
            applied = report.applied,
            failed = report.failed,
            "schema SQL applied"
        );
    }
    Ok(())
}

/// Ensure the configuration store designates a default configuration.
async fn update_engine_configuration(settings: &Settings) -> Result<()> {
    let Some(primary_url) = settings.primary_database_url()? else {
        tracing::warn!("no database URL resolved; skipping configuration update");
        return Ok(());
    };
    let parsed = parse_database_url(&primary_url)?;

    if settings.debug {
        let doc = engine_settings::engine_settings_json(settings, &parsed)?;
        tracing::debug!(engine_settings = %doc, "resolved engine settings");
    }

    let store = PgConfigStore::connect(&driver_parameters(&parsed)).await?;
    let builder = TemplateConfigBuilder::new(settings.config_template.clone());
    let initializer = ConfigInitializer::new(&store, &builder);

    if let Some(new_id) = initializer.ensure_default_config().await? {
        tracing::info!(config_id = %new_id, "created new default configuration");
    }
    Ok(())
}
