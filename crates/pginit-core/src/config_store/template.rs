//! Configuration payload builder backed by an optional JSON template file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::ConfigBuilder;

/// Builds the initial configuration payload. With a template path the file
/// is read and validated as JSON; without one the payload is an empty JSON
/// document the engine fills in on first use.
pub struct TemplateConfigBuilder {
    template: Option<PathBuf>,
}

impl TemplateConfigBuilder {
    pub fn new(template: Option<PathBuf>) -> Self {
        Self { template }
    }
}

#[async_trait]
impl ConfigBuilder for TemplateConfigBuilder {
    type Handle = Value;

    async fn create_empty_config(&self) -> Result<Value> {
        match &self.template {
            Some(path) => {
                let text = tokio::fs::read_to_string(path).await.with_context(|| {
                    format!("reading configuration template {}", path.display())
                })?;
                serde_json::from_str(&text).with_context(|| {
                    format!("configuration template {} is not valid JSON", path.display())
                })
            }
            None => Ok(Value::Object(serde_json::Map::new())),
        }
    }

    async fn serialize(&self, handle: &Value) -> Result<String> {
        serde_json::to_string(handle).context("serializing configuration payload")
    }

    async fn release(&self, _handle: Value) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn without_template_payload_is_an_empty_document() {
        let builder = TemplateConfigBuilder::new(None);
        let handle = builder.create_empty_config().await.unwrap();
        assert_eq!(builder.serialize(&handle).await.unwrap(), "{}");
        builder.release(handle).await.unwrap();
    }

    #[tokio::test]
    async fn template_file_is_read_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        std::fs::write(&path, r#"{"COMPATIBILITY_VERSION": 1}"#).unwrap();

        let builder = TemplateConfigBuilder::new(Some(path));
        let handle = builder.create_empty_config().await.unwrap();
        let payload = builder.serialize(&handle).await.unwrap();
        assert!(payload.contains("COMPATIBILITY_VERSION"));
    }

    #[tokio::test]
    async fn invalid_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        std::fs::write(&path, "not json").unwrap();

        let builder = TemplateConfigBuilder::new(Some(path));
        assert!(builder.create_empty_config().await.is_err());
    }

    #[tokio::test]
    async fn missing_template_is_an_error() {
        let builder = TemplateConfigBuilder::new(Some(PathBuf::from("/nonexistent/t.json")));
        assert!(builder.create_empty_config().await.is_err());
    }
}
