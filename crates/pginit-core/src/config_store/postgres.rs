//! sqlx-backed configuration store over the engine catalog tables.
//!
//! Configuration rows live in `sys_cfg`; the default-configuration pointer
//! is a row in `sys_vars`. Both tables are created by the schema SQL the
//! `mandatory` task applies first.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::ConfigStore;
use crate::connection_string::DatabaseConnectionParameters;
use crate::sql::connect_options;

const VAR_GROUP: &str = "CONFIG";
const VAR_CODE: &str = "DEFAULT_CONFIG_ID";

pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a small pool to the database that hosts the catalog.
    pub async fn connect(params: &DatabaseConnectionParameters) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(connect_options(params)?)
            .await
            .context("connecting to the configuration store database")?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn default_config_id(&self) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT var_value FROM sys_vars WHERE var_group = $1 AND var_code = $2",
        )
        .bind(VAR_GROUP)
        .bind(VAR_CODE)
        .fetch_optional(&self.pool)
        .await
        .context("querying sys_vars for the default configuration id")?;

        Ok(row
            .and_then(|r| r.get::<Option<String>, _>("var_value"))
            .filter(|id| !id.is_empty()))
    }

    async fn add_config(&self, payload: &str, comment: &str) -> Result<String> {
        let mut tx = self.pool.begin().await.context("opening transaction")?;

        let row = sqlx::query(
            "SELECT (COALESCE(MAX(config_data_id), 0) + 1)::BIGINT AS next_id FROM sys_cfg",
        )
            .fetch_one(&mut *tx)
            .await
            .context("allocating a configuration id")?;
        let next_id: i64 = row.get("next_id");

        sqlx::query(
            "INSERT INTO sys_cfg (config_data_id, config_data, config_comments, sys_create_dt) \
             VALUES ($1, $2, $3, NOW())",
        )
        .bind(next_id)
        .bind(payload)
        .bind(comment)
        .execute(&mut *tx)
        .await
        .context("inserting configuration into sys_cfg")?;

        tx.commit().await.context("committing configuration insert")?;
        Ok(next_id.to_string())
    }

    async fn set_default_config_id(&self, id: &str) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE sys_vars SET var_value = $1 WHERE var_group = $2 AND var_code = $3",
        )
        .bind(id)
        .bind(VAR_GROUP)
        .bind(VAR_CODE)
        .execute(&self.pool)
        .await
        .context("updating the default configuration id")?;

        if updated.rows_affected() == 0 {
            sqlx::query("INSERT INTO sys_vars (var_group, var_code, var_value) VALUES ($1, $2, $3)")
                .bind(VAR_GROUP)
                .bind(VAR_CODE)
                .bind(id)
                .execute(&self.pool)
                .await
                .context("inserting the default configuration id")?;
        }
        Ok(())
    }
}
