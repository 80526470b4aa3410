#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record store adapters for the crime heatmap.
//!
//! The aggregation engine never reads files itself. It asks a
//! [`RecordSource`] for a fresh [`RecordCollection`] on every request,
//! optionally pre-filtered by a single [`FieldMatch`]. This crate provides
//! the CSV-file source used in production ([`csv_file`]), an in-memory
//! source for tests and embedding ([`memory`]), and the TOML dataset
//! definitions that declare each dataset's field schema ([`definition`]).

pub mod csv_file;
pub mod definition;
pub mod memory;

use async_trait::async_trait;
use crime_heatmap_records_models::{FieldMatch, FieldSchema, InvalidSchemaError, RecordCollection};

/// Errors that can occur while loading records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Reading the dataset file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The dataset definition TOML could not be parsed.
    #[error("Dataset definition error: {0}")]
    Definition(#[from] toml::de::Error),

    /// The dataset definition describes an inconsistent schema.
    #[error("Invalid schema: {0}")]
    Schema(#[from] InvalidSchemaError),

    /// The file has a column the schema does not declare.
    #[error("Column '{column}' is not declared in the dataset schema")]
    UnknownColumn {
        /// The offending header.
        column: String,
    },

    /// The file has no header row.
    #[error("Dataset file contains no header row")]
    MissingHeader,
}

/// Supplies record collections to the aggregation engine.
///
/// Implementations are called once per logical request. A `pre_filter`
/// keeps only rows whose field equals the given value exactly.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Loads the dataset, keeping only rows matching `pre_filter` if given.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the underlying data cannot be read or
    /// parsed. No partial collection is ever returned.
    async fn load(&self, pre_filter: Option<&FieldMatch>) -> Result<RecordCollection, SourceError>;

    /// The field schema every loaded record conforms to.
    fn schema(&self) -> &FieldSchema;

    /// Short human-readable description for log messages.
    fn describe(&self) -> String;
}
