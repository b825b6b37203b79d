//! Feature schema artifact
//!
//! The ordered list of column names the scoring model was trained on. Loaded
//! once at startup from a JSON array file (`feature_columns.json`).

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

/// Ordered, duplicate-free feature column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema from column names, rejecting empty or duplicated lists
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::Schema("feature schema is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.is_empty() {
                return Err(Error::Schema("feature schema contains an empty column name".to_string()));
            }
            if !seen.insert(column.as_str()) {
                return Err(Error::Schema(format!("duplicate feature column: {}", column)));
            }
        }

        Ok(Self { columns })
    }

    /// Load a schema from a JSON array of strings
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Schema(format!("cannot read schema {}: {}", path.display(), e))
        })?;
        let schema = Self::from_json(&content).map_err(|e| match e {
            Error::Schema(msg) => Error::Schema(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        debug!("Loaded feature schema with {} columns", schema.len());
        Ok(schema)
    }

    /// Parse a schema from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let columns: Vec<String> = serde_json::from_str(content)
            .map_err(|e| Error::Schema(format!("expected a JSON array of column names: {}", e)))?;
        Self::new(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}
