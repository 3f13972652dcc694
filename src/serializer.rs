//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! This module provides functions to serialize OpenAPI documents into standard formats
//! and write them to files or return them as strings.

use crate::cli::OutputFormat;
use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the JSON document
pub const JSON_FILE_NAME: &str = "openapi.json";
/// File name of the YAML document
pub const YAML_FILE_NAME: &str = "openapi.yaml";

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc)
        .context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc)
        .context("Failed to serialize OpenAPI document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Missing parent
/// directories are created.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Writes the document into `output_dir` as `openapi.json`, `openapi.yaml`, or both.
///
/// Both documents are serialized before anything is written. Returns the written paths.
pub fn write_document(
    doc: &OpenApiDocument,
    output_dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::new();
    if matches!(format, OutputFormat::Json | OutputFormat::Both) {
        outputs.push((output_dir.join(JSON_FILE_NAME), serialize_json(doc)?));
    }
    if matches!(format, OutputFormat::Yaml | OutputFormat::Both) {
        outputs.push((output_dir.join(YAML_FILE_NAME), serialize_yaml(doc)?));
    }

    let mut written = Vec::new();
    for (path, content) in outputs {
        write_to_file(&content, &path)?;
        written.push(path);
    }
    Ok(written)
}
