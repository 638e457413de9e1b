//! Engine settings document assembly.
//!
//! The initialized engine consumes a JSON settings document naming its
//! filesystem layout and database connection. The operator may supply the
//! whole document; otherwise it is built from the parsed database URL.

use anyhow::Result;
use serde_json::{json, Value};

use crate::connection_string;
use crate::db_url::ParsedDatabaseUrl;
use crate::settings::Settings;

/// The settings JSON handed to engine components: the operator's document
/// verbatim when supplied, otherwise the constructed one.
pub fn engine_settings_json(settings: &Settings, parsed: &ParsedDatabaseUrl) -> Result<String> {
    if let Some(doc) = &settings.engine_configuration_json {
        if !doc.is_empty() {
            return Ok(doc.clone());
        }
    }
    Ok(engine_settings_document(settings, parsed).to_string())
}

/// Filesystem layout plus the database connection in the engine's dialect.
pub fn engine_settings_document(settings: &Settings, parsed: &ParsedDatabaseUrl) -> Value {
    json!({
        "PIPELINE": {
            "CONFIGPATH": settings.config_dir,
            "RESOURCEPATH": settings.resource_dir,
            "SUPPORTPATH": settings.support_dir,
        },
        "SQL": {
            "BACKEND": "SQL",
            "CONNECTION": connection_string::connection_string(parsed),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_url::parse_database_url;

    #[test]
    fn document_carries_the_dialect_connection_string() {
        let parsed = parse_database_url("postgresql://u:p@h:5432/db").unwrap();
        let doc = engine_settings_document(&Settings::default(), &parsed);
        assert_eq!(
            doc.pointer("/SQL/CONNECTION").and_then(Value::as_str),
            Some("postgresql://u:p@h:5432:db/")
        );
        assert_eq!(
            doc.pointer("/SQL/BACKEND").and_then(Value::as_str),
            Some("SQL")
        );
    }

    #[test]
    fn operator_document_passes_through_verbatim() {
        let settings = Settings {
            engine_configuration_json: Some(r#"{"SQL": {"BACKEND": "SQL"}}"#.to_string()),
            ..Default::default()
        };
        let parsed = parse_database_url("postgresql://u:p@h:5432/db").unwrap();
        assert_eq!(
            engine_settings_json(&settings, &parsed).unwrap(),
            r#"{"SQL": {"BACKEND": "SQL"}}"#
        );
    }
}
