//! Equality and month-range filtering.

use crime_heatmap_analytics_models::{Diagnostics, FilterCriteria, SkipReason, WithDiagnostics};
use crime_heatmap_records_models::{FieldSchema, Record, RecordCollection};

use crate::dates;

enum Verdict {
    Keep,
    Reject,
    Skip(SkipReason),
}

fn judge(record: &Record, criteria: &FilterCriteria, date_field: &str) -> Verdict {
    if !criteria.active_equals().all(|m| m.matches(record)) {
        return Verdict::Reject;
    }

    let Some(range) = criteria.month_range else {
        return Verdict::Keep;
    };

    let Some(date) = record.non_empty(date_field) else {
        return Verdict::Skip(SkipReason::MissingDate);
    };

    match dates::month_number(date) {
        Some(month) if range.contains(month) => Verdict::Keep,
        Some(_) => Verdict::Reject,
        None => Verdict::Skip(SkipReason::UnparseableDate),
    }
}

/// Keeps the records that satisfy every active constraint in `criteria`,
/// preserving their order.
///
/// Equality constraints with an empty value match everything; a record
/// that lacks a constrained field does not match. When a month range is
/// set, records whose offence date is missing or has no valid month are
/// dropped and counted in the returned [`Diagnostics`].
#[must_use]
pub fn filter(
    records: RecordCollection,
    criteria: &FilterCriteria,
    schema: &FieldSchema,
) -> WithDiagnostics<RecordCollection> {
    let date_field = &schema.roles().date;
    let mut diagnostics = Diagnostics::default();

    let kept = records
        .into_iter()
        .filter(|record| {
            diagnostics.scanned();
            match judge(record, criteria, date_field) {
                Verdict::Keep => true,
                Verdict::Reject => false,
                Verdict::Skip(reason) => {
                    log::debug!("Skipping record in month filter: {reason}");
                    diagnostics.skip(reason);
                    false
                }
            }
        })
        .collect();

    WithDiagnostics {
        value: kept,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{collection, incident, schema};

    fn sample() -> RecordCollection {
        collection(vec![
            incident("A", "U1", "2023-01-10", "09:00", "Theft"),
            incident("A", "U1", "2023-03-02", "10:00", "Assault"),
            incident("A", "U2", "2023-02-20", "11:00", "Theft"),
            incident("B", "U1", "2023-05-01", "12:00", "Robbery"),
        ])
    }

    #[test]
    fn keeps_exact_matches_in_order() {
        let criteria = FilterCriteria::new()
            .with_equal("district_name", "A")
            .with_equal("unitname", "U1");
        let out = filter(sample(), &criteria, &schema());
        assert_eq!(out.value.len(), 2);
        assert_eq!(out.value.as_slice()[0].get("Crime_Type"), Some("Theft"));
        assert_eq!(out.value.as_slice()[1].get("Crime_Type"), Some("Assault"));
        assert_eq!(out.diagnostics.records_scanned, 4);
        assert_eq!(out.diagnostics.total_skipped(), 0);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let criteria = FilterCriteria::new().with_equal("district_name", "a");
        assert!(filter(sample(), &criteria, &schema()).value.is_empty());
    }

    #[test]
    fn empty_value_is_a_wildcard() {
        let criteria = FilterCriteria::new()
            .with_equal("district_name", "A")
            .with_equal("unitname", "");
        assert_eq!(filter(sample(), &criteria, &schema()).value.len(), 3);
    }

    #[test]
    fn missing_field_does_not_match() {
        let criteria = FilterCriteria::new().with_equal("victim_sex", "F");
        assert!(filter(sample(), &criteria, &schema()).value.is_empty());
    }

    #[test]
    fn month_range_is_inclusive() {
        let criteria = FilterCriteria::new().with_month_range(2, 3);
        let out = filter(sample(), &criteria, &schema());
        let crimes: Vec<_> = out
            .value
            .iter()
            .filter_map(|r| r.get("Crime_Type"))
            .collect();
        assert_eq!(crimes, vec!["Assault", "Theft"]);
    }

    #[test]
    fn bad_dates_are_skipped_and_counted() {
        let records = collection(vec![
            incident("A", "U1", "2023-01-10", "", "Theft"),
            incident("A", "U1", "", "", "Theft"),
            incident("A", "U1", "10/01/2023", "", "Theft"),
            incident("A", "U1", "2023-xx-01", "", "Theft"),
        ]);
        let criteria = FilterCriteria::new().with_month_range(1, 12);
        let out = filter(records, &criteria, &schema());
        assert_eq!(out.value.len(), 1);
        assert_eq!(out.diagnostics.skipped_for(SkipReason::MissingDate), 1);
        assert_eq!(out.diagnostics.skipped_for(SkipReason::UnparseableDate), 2);
    }

    #[test]
    fn bad_dates_pass_without_a_range() {
        let records = collection(vec![incident("A", "U1", "", "", "Theft")]);
        let out = filter(records, &FilterCriteria::new(), &schema());
        assert_eq!(out.value.len(), 1);
        assert_eq!(out.diagnostics.total_skipped(), 0);
    }

    #[test]
    fn filtering_is_idempotent() {
        let criteria = FilterCriteria::new()
            .with_equal("unitname", "U1")
            .with_month_range(1, 4);
        let once = filter(sample(), &criteria, &schema()).value;
        let twice = filter(once.clone(), &criteria, &schema()).value;
        assert_eq!(once, twice);
    }
}
