//! CSV-file record source.
//!
//! Reads the whole dataset file on every [`RecordSource::load`] call,
//! parses it with the header row as field names, validates the headers
//! against the dataset schema and returns every row as a [`Record`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crime_heatmap_records_models::{FieldMatch, FieldSchema, Record, RecordCollection};

use crate::definition::{DatasetDefinition, UnknownColumnPolicy};
use crate::{RecordSource, SourceError};

/// Record source backed by a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    /// Path of the CSV file.
    path: PathBuf,
    /// Schema built from the dataset definition.
    schema: FieldSchema,
    /// Handling of undeclared columns.
    unknown_columns: UnknownColumnPolicy,
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
}

impl CsvRecordSource {
    /// Creates a source for the CSV at `path` described by `definition`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Schema`] if the definition's schema is
    /// inconsistent.
    pub fn new(path: &Path, definition: &DatasetDefinition) -> Result<Self, SourceError> {
        Ok(Self {
            path: path.to_path_buf(),
            schema: definition.schema()?,
            unknown_columns: definition.unknown_columns,
            delimiter: b',',
        })
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for CsvRecordSource {
    async fn load(&self, pre_filter: Option<&FieldMatch>) -> Result<RecordCollection, SourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        log::debug!("Read {} bytes from {}", bytes.len(), self.path.display());

        let records = parse_records(
            &bytes,
            &self.schema,
            self.unknown_columns,
            self.delimiter,
            pre_filter,
        )?;

        log::info!(
            "Loaded {} records from {}{}",
            records.len(),
            self.path.display(),
            pre_filter.map_or_else(String::new, |m| format!(
                " where {} = '{}'",
                m.field, m.value
            ))
        );

        Ok(records)
    }

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

/// Parses CSV bytes into records keyed by the header row.
///
/// Header names are trimmed; values are kept exactly as written. Rows with
/// fewer cells than headers get empty strings for the missing cells.
///
/// # Errors
///
/// Returns [`SourceError`] if the CSV is malformed, has no header row, or
/// (under [`UnknownColumnPolicy::Reject`]) has an undeclared column.
pub fn parse_records(
    bytes: &[u8],
    schema: &FieldSchema,
    unknown_columns: UnknownColumnPolicy,
    delimiter: u8,
    pre_filter: Option<&FieldMatch>,
) -> Result<RecordCollection, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::MissingHeader);
    }

    // `None` marks a column that is dropped from every record.
    let mut columns: Vec<Option<String>> = Vec::with_capacity(headers.len());
    for header in headers {
        if schema.contains(&header) {
            columns.push(Some(header));
            continue;
        }
        match unknown_columns {
            UnknownColumnPolicy::Reject => {
                return Err(SourceError::UnknownColumn { column: header });
            }
            UnknownColumnPolicy::Ignore => {
                log::warn!("Ignoring undeclared column '{header}'");
                columns.push(None);
            }
        }
    }

    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;

        let record: Record = columns
            .iter()
            .enumerate()
            .filter_map(|(i, column)| {
                column
                    .as_ref()
                    .map(|name| (name.clone(), row.get(i).unwrap_or("").to_owned()))
            })
            .collect();

        if pre_filter.is_none_or(|m| m.matches(&record)) {
            records.push(record);
        }
    }

    Ok(RecordCollection::new(records))
}
