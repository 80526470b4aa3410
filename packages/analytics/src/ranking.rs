//! Value frequency ranking.
//!
//! Counts how often each value of a field occurs and returns the most
//! frequent ones. Placeholder values (empty, or nothing but hyphens,
//! commas and whitespace) are never counted. Ties keep the order in which
//! the values were first seen, so results are stable for a given input.

use std::collections::HashMap;
use std::sync::LazyLock;

use crime_heatmap_analytics_models::{LocationSummary, ValueCount};
use crime_heatmap_records_models::{FieldRoles, Record};
use regex::Regex;

/// Default number of entries returned by [`top_occurrences`].
pub const DEFAULT_LIMIT: usize = 10;

/// Values made up only of hyphens, commas and whitespace (including the
/// empty string).
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-,\s]*$").expect("valid regex"));

/// Whether `value` carries no information and should not be ranked.
#[must_use]
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER_RE.is_match(value)
}

/// Counter that remembers the order values were first seen in.
#[derive(Debug, Clone, Default)]
pub struct OrderedCounter {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl OrderedCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `value`.
    pub fn add(&mut self, value: &str) {
        if let Some(&i) = self.index.get(value) {
            self.entries[i].1 += 1;
        } else {
            self.index.insert(value.to_string(), self.entries.len());
            self.entries.push((value.to_string(), 1));
        }
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `limit` most frequent values, count descending, ties in
    /// first-seen order.
    #[must_use]
    pub fn ranked(&self, limit: usize) -> Vec<ValueCount> {
        self.clone().into_ranked(limit)
    }

    /// Consuming variant of [`Self::ranked`].
    #[must_use]
    pub fn into_ranked(self, limit: usize) -> Vec<ValueCount> {
        let mut entries = self.entries;
        // stable: equal counts stay in first-seen order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
            .into_iter()
            .take(limit)
            .map(|(value, count)| ValueCount { value, count })
            .collect()
    }
}

/// Ranks `values`, skipping placeholders.
#[must_use]
pub fn rank_values<'a>(values: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<ValueCount> {
    let mut counter = OrderedCounter::new();
    for value in values {
        if !is_placeholder(value) {
            counter.add(value);
        }
    }
    counter.into_ranked(limit)
}

/// The `limit` most frequent non-placeholder values of `field`.
///
/// Records that lack the field are ignored.
#[must_use]
pub fn top_occurrences(records: &[Record], field: &str, limit: usize) -> Vec<ValueCount> {
    rank_values(records.iter().filter_map(|r| r.get(field)), limit)
}

/// The `limit` most frequent latitudes, each with the most common
/// longitude and crime type recorded at that latitude.
///
/// Only records with a non-empty longitude are considered when picking
/// the pairing for a latitude.
#[must_use]
pub fn top_locations(records: &[Record], roles: &FieldRoles, limit: usize) -> Vec<LocationSummary> {
    top_occurrences(records, &roles.latitude, limit)
        .into_iter()
        .map(|lat| {
            let at_latitude: Vec<&Record> = records
                .iter()
                .filter(|r| {
                    r.get(&roles.latitude) == Some(lat.value.as_str())
                        && r.non_empty(&roles.longitude).is_some()
                })
                .collect();

            let longitude = first_ranked(&at_latitude, &roles.longitude);
            let crime_type = first_ranked(&at_latitude, &roles.category);

            LocationSummary {
                latitude: lat.value,
                longitude,
                crime_type,
            }
        })
        .collect()
}

fn first_ranked(records: &[&Record], field: &str) -> Option<String> {
    rank_values(records.iter().filter_map(|r| r.get(field)), 1)
        .into_iter()
        .next()
        .map(|v| v.value)
}
