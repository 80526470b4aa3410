//! Config-driven dataset definitions.
//!
//! A [`DatasetDefinition`] enumerates every column a dataset may contain
//! and assigns the columns used for drill-down and aggregation. Built-in
//! definitions live in `packages/records/datasets/` and are baked into the
//! binary via [`include_str!`]; a definition can also be read from disk at
//! startup.

use std::path::Path;

use crime_heatmap_records_models::{FieldRoles, FieldSchema};
use serde::Deserialize;

use crate::SourceError;

/// TOML definitions embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[(
    "karnataka_fir",
    include_str!("../datasets/karnataka_fir.toml"),
)];

/// Identifier of the definition used when none is configured.
pub const DEFAULT_DATASET_ID: &str = "karnataka_fir";

/// What to do with a CSV column the schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownColumnPolicy {
    /// Fail the load.
    #[default]
    Reject,
    /// Drop the column from every record and log a warning.
    Ignore,
}

/// A complete dataset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"karnataka_fir"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Handling of undeclared columns.
    #[serde(default)]
    pub unknown_columns: UnknownColumnPolicy,
    /// Every column the dataset may contain.
    pub fields: Vec<String>,
    /// Columns summarised by the beat analysis.
    #[serde(default)]
    pub analysis_fields: Vec<String>,
    /// Column assignments.
    pub roles: FieldRoles,
}

impl DatasetDefinition {
    /// Builds the validated [`FieldSchema`] for this definition.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Schema`] if a role or analysis field is not
    /// declared, or a field is declared twice.
    pub fn schema(&self) -> Result<FieldSchema, SourceError> {
        Ok(FieldSchema::new(
            self.fields.clone(),
            self.roles.clone(),
            self.analysis_fields.clone(),
        )?)
    }
}

/// Parses a dataset definition from a TOML string.
///
/// # Errors
///
/// Returns [`SourceError::Definition`] if the TOML is malformed or missing
/// required keys.
pub fn parse_definition(toml_str: &str) -> Result<DatasetDefinition, SourceError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Looks up a built-in definition by id.
///
/// # Errors
///
/// Returns [`SourceError::Definition`] if the embedded TOML is malformed.
pub fn builtin_definition(id: &str) -> Result<Option<DatasetDefinition>, SourceError> {
    DATASET_TOMLS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, toml)| parse_definition(toml))
        .transpose()
}

/// Loads the definition at `path`, or the default built-in definition
/// when no path is given.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or parsed.
pub async fn load_definition(path: Option<&Path>) -> Result<DatasetDefinition, SourceError> {
    if let Some(path) = path {
        log::info!("Loading dataset definition from {}", path.display());
        let text = tokio::fs::read_to_string(path).await?;
        return parse_definition(&text);
    }

    builtin_definition(DEFAULT_DATASET_ID)?.ok_or_else(|| {
        SourceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no built-in dataset definition '{DEFAULT_DATASET_ID}'"),
        ))
    })
}
