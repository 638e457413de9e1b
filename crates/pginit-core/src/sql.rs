//! Schema SQL loading and application.
//!
//! The schema ships as a file of single-line SQL statements. Statements
//! are applied one at a time; an individual failure is logged and the run
//! continues, so re-running against an already-initialized database is
//! expected and harmless.

use anyhow::{bail, Context, Result};
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::connection_string::DatabaseConnectionParameters;

/// Load SQL statements from `file://`, a bare absolute path, or
/// `http(s)://`. One statement per nonempty line.
pub async fn load_statements(input_sql_url: &str) -> Result<Vec<String>> {
    let text = if let Some(path) = input_sql_url.strip_prefix("file://") {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading SQL file {path}"))?
    } else if input_sql_url.starts_with("http://") || input_sql_url.starts_with("https://") {
        let url = input_sql_url.to_string();
        tokio::task::spawn_blocking(move || fetch_text(&url))
            .await
            .context("SQL fetch task failed")??
    } else if input_sql_url.starts_with('/') {
        tokio::fs::read_to_string(input_sql_url)
            .await
            .with_context(|| format!("reading SQL file {input_sql_url}"))?
    } else {
        bail!("unsupported SQL source: {input_sql_url}");
    };

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// GET a text resource over HTTP. Runs on a blocking thread; curl performs
/// the transfer synchronously.
fn fetch_text(url: &str) -> Result<String> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("SQL fetch failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        bail!("GET {} returned HTTP {}", url, code);
    }

    String::from_utf8(body).context("SQL file is not UTF-8")
}

/// Connection options from driver parameters. An empty port falls back to
/// 5432, an empty user to `postgres`.
pub fn connect_options(params: &DatabaseConnectionParameters) -> Result<PgConnectOptions> {
    let port: u16 = if params.port.is_empty() {
        5432
    } else {
        params
            .port
            .parse()
            .with_context(|| format!("invalid port {:?}", params.port))?
    };
    let user = if params.user.is_empty() {
        "postgres"
    } else {
        params.user.as_str()
    };

    let mut options = PgConnectOptions::new()
        .host(&params.host)
        .port(port)
        .username(user)
        .database(&params.dbname);
    if !params.password.is_empty() {
        options = options.password(&params.password);
    }
    Ok(options)
}

/// Statement-application outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub failed: usize,
}

/// Execute each statement against the target database. Individual
/// statement failures are logged and skipped; failing to reach the
/// database at all is fatal.
pub async fn apply_statements(
    params: &DatabaseConnectionParameters,
    statements: &[String],
) -> Result<ApplyReport> {
    let mut conn = PgConnection::connect_with(&connect_options(params)?)
        .await
        .with_context(|| format!("connecting to {}:{}", params.host, params.port))?;

    let mut report = ApplyReport::default();
    for statement in statements {
        match sqlx::query(statement).execute(&mut conn).await {
            Ok(_) => report.applied += 1,
            Err(err) => {
                report.failed += 1;
                tracing::error!(error = %err, statement = %statement, "SQL statement failed");
            }
        }
    }

    conn.close().await.ok();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(port: &str, user: &str) -> DatabaseConnectionParameters {
        DatabaseConnectionParameters {
            dbname: "db".to_string(),
            user: user.to_string(),
            password: "secret".to_string(),
            host: "h".to_string(),
            port: port.to_string(),
        }
    }

    #[tokio::test]
    async fn load_statements_splits_nonempty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.sql");
        std::fs::write(
            &path,
            "CREATE TABLE a (id BIGINT);\n\n  \nCREATE TABLE b (id BIGINT);\n",
        )
        .unwrap();

        let statements = load_statements(&format!("file://{}", path.display()))
            .await
            .unwrap();
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE a (id BIGINT);".to_string(),
                "CREATE TABLE b (id BIGINT);".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn load_statements_accepts_a_bare_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.sql");
        std::fs::write(&path, "SELECT 1;\n").unwrap();

        let statements = load_statements(path.to_str().unwrap()).await.unwrap();
        assert_eq!(statements, vec!["SELECT 1;".to_string()]);
    }

    #[tokio::test]
    async fn load_statements_rejects_unknown_sources() {
        assert!(load_statements("ftp://example.com/schema.sql").await.is_err());
    }

    #[test]
    fn connect_options_fills_defaults() {
        let options = connect_options(&params("", "")).unwrap();
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "postgres");
        assert_eq!(options.get_host(), "h");
        assert_eq!(options.get_database(), Some("db"));
    }

    #[test]
    fn connect_options_uses_explicit_values() {
        let options = connect_options(&params("6543", "admin")).unwrap();
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "admin");
    }

    #[test]
    fn connect_options_rejects_a_bad_port() {
        assert!(connect_options(&params("not-a-port", "u")).is_err());
    }
}
