#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter criteria, request parameters and aggregation result types.
//!
//! Result types serialize with `camelCase` keys so the JSON matches what
//! the drill-down UI already consumes (`topCrimes`, `allData`, `freq`, ...).

use std::collections::BTreeMap;

use crime_heatmap_records_models::{FieldMatch, RecordCollection};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Bucket width for time-series queries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeGranularity {
    /// Hour of day, always 24 buckets.
    Hourly,
    /// Week of year.
    Weekly,
    /// Month of year.
    Monthly,
}

/// Inclusive range of months (1-12) derived from the offence date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRange {
    /// First month included.
    pub start: u32,
    /// Last month included.
    pub end: u32,
}

impl MonthRange {
    /// Whether `month` lies within the range.
    #[must_use]
    pub const fn contains(&self, month: u32) -> bool {
        self.start <= month && month <= self.end
    }
}

/// Equality and month-range constraints applied by the filter engine.
///
/// An equality constraint with an empty expected value is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// `field == value` constraints, all of which must hold.
    pub equals: Vec<FieldMatch>,
    /// Optional inclusive month range on the offence date.
    pub month_range: Option<MonthRange>,
}

impl FilterCriteria {
    /// Criteria that match every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `field == value` constraint.
    #[must_use]
    pub fn with_equal(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.push(FieldMatch::new(field, value));
        self
    }

    /// Adds a constraint only when `value` is present.
    #[must_use]
    pub fn with_optional_equal(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with_equal(field, value),
            None => self,
        }
    }

    /// Restricts the offence month to `start..=end`.
    #[must_use]
    pub const fn with_month_range(mut self, start: u32, end: u32) -> Self {
        self.month_range = Some(MonthRange { start, end });
        self
    }

    /// Equality constraints that actually restrict (non-empty value).
    pub fn active_equals(&self) -> impl Iterator<Item = &FieldMatch> {
        self.equals.iter().filter(|m| !m.value.is_empty())
    }
}

/// A value and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueCount {
    /// The field value.
    pub value: String,
    /// Number of occurrences.
    #[serde(rename = "freq")]
    pub count: u64,
}

/// A value -> count census for a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u64>,
}

impl FrequencyTable {
    /// Counts one more occurrence of `value`.
    pub fn increment(&mut self, value: &str) {
        if let Some(count) = self.counts.get_mut(value) {
            *count += 1;
        } else {
            self.counts.insert(value.to_string(), 1);
        }
    }

    /// Occurrences of `value` (zero if never seen).
    #[must_use]
    pub fn get(&self, value: &str) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates `(value, count)` in value order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// One [`FrequencyTable`] per schema field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldFrequencyTables {
    tables: BTreeMap<String, FrequencyTable>,
}

impl FieldFrequencyTables {
    /// Table for `field`, creating it on first use.
    pub fn table_mut(&mut self, field: &str) -> &mut FrequencyTable {
        self.tables.entry(field.to_string()).or_default()
    }

    /// Table for `field`, if any record carried it.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FrequencyTable> {
        self.tables.get(field)
    }

    /// Iterates `(field, table)` in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrequencyTable)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields with a table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no field has a table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Counts and top crime types for one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourBucket {
    /// Label such as `"9:00"`.
    pub hour: String,
    /// Incidents in this hour.
    pub count: u64,
    /// Top three crime types as `"Theft (4), Assault (2)"`, or `"No data"`.
    pub top_crimes: String,
}

/// Counts and top crime types for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    /// Month key as written in the date, e.g. `"01"`.
    pub month: String,
    /// Incidents in this month.
    pub count: u64,
    /// Top three crime types, or `"No data"`.
    pub top_crimes: String,
}

/// Counts and top crime types for one week of the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    /// Week number, starting at 1 for the week containing January 1.
    pub week: u32,
    /// Incidents in this week.
    pub count: u64,
    /// Top three crime types, or `"No data"`.
    pub top_crimes: String,
}

/// A frequently reported latitude with its most common pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    /// The latitude value as recorded.
    pub latitude: String,
    /// Most common longitude recorded with this latitude.
    pub longitude: Option<String>,
    /// Most common crime type recorded at this latitude.
    pub crime_type: Option<String>,
}

/// Ranked summaries for a district/unit/month-range query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsSummary {
    /// Most frequent locations.
    pub top_lat_long: Vec<LocationSummary>,
    /// Most frequent crime groups.
    pub top_crime_groups: Vec<ValueCount>,
    /// Most frequent crime types.
    pub top_crimes: Vec<ValueCount>,
    /// Most frequent months.
    pub top_months: Vec<ValueCount>,
}

/// Summary plus the filtered rows it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsResult {
    /// Ranked summaries.
    pub details: DetailsSummary,
    /// Every record that matched the filter.
    pub all_data: RecordCollection,
}

/// One ranked value with its share of the field total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedShare {
    /// The field value.
    pub value: String,
    /// Number of occurrences.
    pub count: u64,
    /// Whole-number percentage of the field total, rounded down.
    pub percentage: u64,
}

/// Census and top-3 for one field of a beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    /// Field name.
    pub field: String,
    /// Counted occurrences (excludes the literal `"null"`).
    pub total: u64,
    /// Full value census.
    pub counts: FrequencyTable,
    /// Three most frequent values.
    pub top: Vec<RankedShare>,
}

/// A map marker for a frequently reported coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Crime type of the first incident seen at this pair.
    pub crime_type: String,
    /// Incidents at this pair.
    pub count: u64,
}

/// Field-by-field summary of a single beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatAnalysis {
    /// District the beat belongs to.
    pub district: String,
    /// Unit the beat belongs to.
    pub unit: String,
    /// Beat name.
    pub beat: String,
    /// Records in the beat.
    pub total_records: u64,
    /// One summary per analysis field.
    pub fields: Vec<FieldSummary>,
    /// Top coordinate pairs.
    pub hotspots: Vec<Hotspot>,
    /// Numbered narrative lines, one per field.
    pub analysis_text: String,
}

/// Why a record was left out of an aggregation.
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
pub enum SkipReason {
    /// Date field absent or empty.
    MissingDate,
    /// Date field present but not in a usable shape.
    UnparseableDate,
    /// Time field absent or empty.
    MissingTime,
    /// Time field present but the hour is not 0-23.
    UnparseableTime,
}

/// Scan and skip counters for one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Records examined.
    pub records_scanned: u64,
    /// Records left out, by reason.
    pub skipped: BTreeMap<SkipReason, u64>,
}

impl Diagnostics {
    /// Counts one examined record.
    pub const fn scanned(&mut self) {
        self.records_scanned += 1;
    }

    /// Counts one skipped record.
    pub fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    /// Total records skipped for any reason.
    #[must_use]
    pub fn total_skipped(&self) -> u64 {
        self.skipped.values().sum()
    }

    /// Skips recorded for `reason`.
    #[must_use]
    pub fn skipped_for(&self, reason: SkipReason) -> u64 {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    /// Adds another pass's counters into this one.
    pub fn merge(&mut self, other: &Self) {
        self.records_scanned += other.records_scanned;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_insert(0) += count;
        }
    }
}

/// An aggregation result together with its [`Diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithDiagnostics<T> {
    /// The aggregation result.
    pub value: T,
    /// Counters collected while producing it.
    pub diagnostics: Diagnostics,
}

/// Path parameters for district/unit scoped queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictUnitParams {
    /// District name.
    pub district: String,
    /// Unit name.
    pub unit: String,
}

/// Body of a details query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsParams {
    /// District name; empty or absent matches every district.
    pub district: Option<String>,
    /// Unit name; empty or absent matches every unit.
    pub unit: Option<String>,
    /// First month included (1-12).
    pub start_month: u32,
    /// Last month included (1-12).
    pub end_month: u32,
}

/// Body of a full-census query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrequencyParams {
    /// District to restrict to.
    pub selected_district: Option<String>,
    /// Unit to restrict to.
    pub selected_unit: Option<String>,
}

/// Body of a beat analysis query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatAnalysisParams {
    /// District name (used for the narrative text).
    pub district: String,
    /// Unit name (used for the narrative text).
    pub unit: String,
    /// Beat name.
    pub beat: String,
}
