//! Whole-field value census and distinct-value listing.

use std::collections::HashSet;

use crime_heatmap_analytics_models::FieldFrequencyTables;
use crime_heatmap_records_models::{FieldSchema, Record};

/// Counts every raw value of every schema field.
///
/// Nothing is trimmed or excluded, so each field's total equals the
/// number of records carrying that field. Fields found on a record but
/// not declared in the schema are ignored.
#[must_use]
pub fn build_frequency_tables(records: &[Record], schema: &FieldSchema) -> FieldFrequencyTables {
    let mut tables = FieldFrequencyTables::default();
    let mut undeclared = 0_u64;

    for record in records {
        for (field, value) in record.iter() {
            if schema.contains(field) {
                tables.table_mut(field).increment(value);
            } else {
                undeclared += 1;
            }
        }
    }

    if undeclared > 0 {
        log::warn!("Ignored {undeclared} values of fields missing from the schema");
    }

    tables
}

/// Distinct values of `field` in first-seen order.
///
/// Records lacking the field contribute nothing; the empty string counts
/// as a value of its own.
#[must_use]
pub fn unique_values(records: &[Record], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| r.get(field))
        .filter(|v| seen.insert(*v))
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FIELDS, incident, record, schema};

    #[test]
    fn census_totals_match_record_count() {
        let schema = schema();
        let records = vec![
            incident("A", "U1", "2023-01-01", "09:00", "Theft"),
            incident("A", "U2", "2023-01-02", "", "Theft"),
            incident("B", "U1", "", "10:00", ""),
        ];
        let tables = build_frequency_tables(&records, &schema);

        assert_eq!(tables.len(), FIELDS.len());
        for (_, table) in tables.iter() {
            assert_eq!(table.total(), 3);
        }
        let crimes = tables.get("Crime_Type").unwrap();
        assert_eq!(crimes.get("Theft"), 2);
        assert_eq!(crimes.get(""), 1);
    }

    #[test]
    fn census_keeps_raw_values() {
        let schema = schema();
        let records = vec![
            record(&[("Crime_Type", " Theft")]),
            record(&[("Crime_Type", "Theft")]),
            record(&[("Crime_Type", "-")]),
        ];
        let tables = build_frequency_tables(&records, &schema);
        let crimes = tables.get("Crime_Type").unwrap();
        assert_eq!(crimes.len(), 3);
        assert_eq!(crimes.get("-"), 1);
    }

    #[test]
    fn undeclared_fields_are_ignored() {
        let schema = schema();
        let records = vec![record(&[("FIRNo", "12"), ("beat_name", "B1")])];
        let tables = build_frequency_tables(&records, &schema);
        assert!(tables.get("FIRNo").is_none());
        assert_eq!(tables.get("beat_name").unwrap().total(), 1);
    }

    #[test]
    fn census_of_nothing_is_empty() {
        assert!(build_frequency_tables(&[], &schema()).is_empty());
    }

    #[test]
    fn unique_values_keep_first_seen_order() {
        let records = vec![
            record(&[("unitname", "Town PS")]),
            record(&[("unitname", "Rural PS")]),
            record(&[("unitname", "")]),
            record(&[("district_name", "A")]),
            record(&[("unitname", "Town PS")]),
        ];
        assert_eq!(
            unique_values(&records, "unitname"),
            vec!["Town PS", "Rural PS", ""]
        );
    }
}
