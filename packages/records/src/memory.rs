//! In-memory record source.

use async_trait::async_trait;
use crime_heatmap_records_models::{FieldMatch, FieldSchema, RecordCollection};

use crate::{RecordSource, SourceError};

/// Serves a fixed collection held in memory.
///
/// Every load returns a fresh copy, so callers can never observe each
/// other's filtering.
#[derive(Debug, Clone)]
pub struct InMemoryRecordSource {
    records: RecordCollection,
    schema: FieldSchema,
}

impl InMemoryRecordSource {
    /// Wraps `records`, which are expected to conform to `schema`.
    #[must_use]
    pub const fn new(records: RecordCollection, schema: FieldSchema) -> Self {
        Self { records, schema }
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn load(&self, pre_filter: Option<&FieldMatch>) -> Result<RecordCollection, SourceError> {
        Ok(match pre_filter {
            Some(m) => self.records.iter().filter(|r| m.matches(r)).cloned().collect(),
            None => self.records.clone(),
        })
    }

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn describe(&self) -> String {
        format!("memory:{} records", self.records.len())
    }
}
