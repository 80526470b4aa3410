#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flat incident record types and the dataset field schema.
//!
//! A [`Record`] is a mapping of field name to raw string value exactly as
//! it appeared in the source file. Numeric and date fields stay strings
//! here; the analytics crate parses them on demand. Which field plays
//! which part (district, beat, offence date, ...) is described by a
//! [`FieldSchema`] built once per dataset.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A single flat incident record.
///
/// Records carry no identity; two records with the same values are
/// indistinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, String>,
}

impl Record {
    /// Creates a record from an already-built field map.
    #[must_use]
    pub const fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Returns the raw value of `field`, or `None` if the record lacks it.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Returns the value of `field` when it is present and non-empty.
    #[must_use]
    pub fn non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    /// Iterates over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields in this record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An ordered sequence of records, in source insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl RecordCollection {
    /// Wraps a vector of records.
    #[must_use]
    pub const fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Borrows the records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Iterates over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unwraps the collection into its records.
    #[must_use]
    pub fn into_inner(self) -> Vec<Record> {
        self.records
    }
}

impl FromIterator<Record> for RecordCollection {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A single `field == value` equality pair, used by data sources to
/// pre-filter rows while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatch {
    /// Field name to compare.
    pub field: String,
    /// Expected value (exact, case-sensitive).
    pub value: String,
}

impl FieldMatch {
    /// Creates a new equality pair.
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether `record` holds exactly [`Self::value`] in [`Self::field`].
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.field) == Some(self.value.as_str())
    }
}

/// The part a field plays in the drill-down and aggregation queries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldRole {
    /// Top-level geographic division
    District,
    /// Police unit within a district
    Unit,
    /// Patrol beat within a unit
    Beat,
    /// Offence date, `YYYY-MM-DD`
    Date,
    /// Offence time of day, `HH:MM[:SS]`
    Time,
    /// Crime type used for top-category breakdowns
    Category,
    /// Coarser crime grouping
    CategoryGroup,
    /// Latitude as recorded in the source
    Latitude,
    /// Longitude as recorded in the source
    Longitude,
    /// Precomputed month column
    Month,
}

impl FieldRole {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::District,
            Self::Unit,
            Self::Beat,
            Self::Date,
            Self::Time,
            Self::Category,
            Self::CategoryGroup,
            Self::Latitude,
            Self::Longitude,
            Self::Month,
        ]
    }
}

/// Maps each [`FieldRole`] to the dataset's column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRoles {
    /// District column.
    pub district: String,
    /// Unit column.
    pub unit: String,
    /// Beat column.
    pub beat: String,
    /// Offence date column.
    pub date: String,
    /// Offence time-of-day column.
    pub time: String,
    /// Crime type column.
    pub category: String,
    /// Crime group column.
    pub category_group: String,
    /// Latitude column.
    pub latitude: String,
    /// Longitude column.
    pub longitude: String,
    /// Month column.
    pub month: String,
}

impl FieldRoles {
    /// Returns the column name assigned to `role`.
    #[must_use]
    pub fn get(&self, role: FieldRole) -> &str {
        match role {
            FieldRole::District => &self.district,
            FieldRole::Unit => &self.unit,
            FieldRole::Beat => &self.beat,
            FieldRole::Date => &self.date,
            FieldRole::Time => &self.time,
            FieldRole::Category => &self.category,
            FieldRole::CategoryGroup => &self.category_group,
            FieldRole::Latitude => &self.latitude,
            FieldRole::Longitude => &self.longitude,
            FieldRole::Month => &self.month,
        }
    }
}

/// The validated, explicitly enumerated field schema of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<String>,
    roles: FieldRoles,
    analysis_fields: Vec<String>,
}

impl FieldSchema {
    /// Builds a schema, checking that every role and analysis field names
    /// a declared field.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSchemaError`] if no fields are declared, a field is
    /// declared twice, or a role/analysis field is not declared.
    pub fn new(
        fields: Vec<String>,
        roles: FieldRoles,
        analysis_fields: Vec<String>,
    ) -> Result<Self, InvalidSchemaError> {
        if fields.is_empty() {
            return Err(InvalidSchemaError::NoFields);
        }

        let mut seen = BTreeSet::new();
        for field in &fields {
            if !seen.insert(field.as_str()) {
                return Err(InvalidSchemaError::DuplicateField {
                    field: field.clone(),
                });
            }
        }

        for role in FieldRole::all() {
            let field = roles.get(*role);
            if !seen.contains(field) {
                return Err(InvalidSchemaError::UnknownRoleField {
                    role: *role,
                    field: field.to_string(),
                });
            }
        }

        if let Some(field) = analysis_fields
            .iter()
            .find(|f| !seen.contains(f.as_str()))
        {
            return Err(InvalidSchemaError::UnknownAnalysisField {
                field: field.clone(),
            });
        }

        Ok(Self {
            fields,
            roles,
            analysis_fields,
        })
    }

    /// Declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether `field` is declared.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Column names for each role.
    #[must_use]
    pub const fn roles(&self) -> &FieldRoles {
        &self.roles
    }

    /// Fields summarised by the beat analysis, in display order.
    #[must_use]
    pub fn analysis_fields(&self) -> &[String] {
        &self.analysis_fields
    }
}

/// Error returned when a [`FieldSchema`] is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSchemaError {
    /// The schema declares no fields.
    NoFields,
    /// A field name is declared more than once.
    DuplicateField {
        /// The repeated field name.
        field: String,
    },
    /// A role points at an undeclared field.
    UnknownRoleField {
        /// The role being assigned.
        role: FieldRole,
        /// The undeclared field name.
        field: String,
    },
    /// An analysis field is not declared.
    UnknownAnalysisField {
        /// The undeclared field name.
        field: String,
    },
}

impl std::fmt::Display for InvalidSchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFields => write!(f, "schema declares no fields"),
            Self::DuplicateField { field } => write!(f, "field '{field}' is declared twice"),
            Self::UnknownRoleField { role, field } => {
                write!(f, "role '{role}' refers to undeclared field '{field}'")
            }
            Self::UnknownAnalysisField { field } => {
                write!(f, "analysis field '{field}' is not declared")
            }
        }
    }
}

impl std::error::Error for InvalidSchemaError {}
