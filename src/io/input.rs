use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::{FormSchema, parse_form_schema};

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            toml::from_str::<Value>(contents).with_context(|| "failed to parse TOML document")
        }
    }
}

/// Parse and validate a form schema document.
pub fn load_form_schema_str(contents: &str, format: DocumentFormat) -> Result<FormSchema> {
    let document = parse_document_str(contents, format)?;
    parse_form_schema(&document).context("schema document failed validation")
}

/// Load a schema file, picking the format from its extension (JSON when
/// unknown).
pub fn load_form_schema_file(path: impl AsRef<Path>) -> Result<FormSchema> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;
    let format = DocumentFormat::from_path(path).unwrap_or_default();
    load_form_schema_str(&contents, format)
        .with_context(|| format!("failed to load schema from {}", path.display()))
}

/// Parse an existing record to hydrate an edit dialog. The record must be an
/// object keyed by field key.
pub fn parse_record_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    let record = parse_document_str(contents, format)?;
    anyhow::ensure!(
        record.is_object(),
        "record document must be an object, got {record}"
    );
    Ok(record)
}
