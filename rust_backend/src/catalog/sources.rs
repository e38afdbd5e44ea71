//! Built-in catalog sources: in-memory records and JSON/YAML files.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{calculate_checksum, CatalogContent, CatalogSource};
use crate::error::{SchedulerError, SchedulerResult};
use crate::models::RawRecord;

/// Records supplied directly by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryCatalog {
    records: Vec<RawRecord>,
}

impl InMemoryCatalog {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON document holding a sequence of records.
    pub fn from_json_str(json: &str) -> SchedulerResult<Self> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| SchedulerError::Catalog(format!("Invalid JSON catalog: {}", e)))?;
        Ok(Self::new(records_from_document(document)?))
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }
}

impl CatalogSource for InMemoryCatalog {
    fn describe(&self) -> String {
        format!("in-memory catalog ({} records)", self.records.len())
    }

    fn read(&self) -> SchedulerResult<CatalogContent> {
        let serialized = serde_json::to_string(&self.records)
            .map_err(|e| SchedulerError::Catalog(format!("Failed to serialize records: {}", e)))?;
        Ok(CatalogContent {
            records: self.records.clone(),
            checksum: calculate_checksum(&serialized),
        })
    }
}

/// On-disk catalog document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> SchedulerResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                SchedulerError::Catalog(format!("File has no extension: {}", path.display()))
            })?;

        match extension.to_lowercase().as_str() {
            "json" => Ok(CatalogFormat::Json),
            "yaml" | "yml" => Ok(CatalogFormat::Yaml),
            other => Err(SchedulerError::Catalog(format!(
                "Unsupported catalog format: {}",
                other
            ))),
        }
    }

    /// Decode a document in this format.
    pub fn parse(&self, content: &str) -> SchedulerResult<Vec<RawRecord>> {
        let document: Value = match self {
            CatalogFormat::Json => serde_json::from_str(content)
                .map_err(|e| SchedulerError::Catalog(format!("Invalid JSON catalog: {}", e)))?,
            CatalogFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| SchedulerError::Catalog(format!("Invalid YAML catalog: {}", e)))?,
        };
        records_from_document(document)
    }
}

/// A catalog file whose format follows its extension (`.json`, `.yaml`, `.yml`).
#[derive(Debug, Clone, PartialEq)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalog {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> SchedulerResult<CatalogContent> {
        let format = CatalogFormat::from_path(&self.path)?;
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            SchedulerError::Catalog(format!(
                "Failed to read catalog file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(CatalogContent {
            records: format.parse(&content)?,
            checksum: calculate_checksum(&content),
        })
    }
}

/// Extract the ordered record list from a decoded document.
///
/// The document is either a sequence of records or a mapping with a
/// `targets` sequence.
fn records_from_document(document: Value) -> SchedulerResult<Vec<RawRecord>> {
    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("targets") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(SchedulerError::Catalog(format!(
                "Catalog mapping must contain a 'targets' sequence. Found keys: {:?}",
                map.keys().collect::<Vec<_>>()
            ))),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(SchedulerError::Catalog(
            "Catalog must be a sequence of target records".to_string(),
        )),
    }
}
