//! Query functions behind the drill-down API.
//!
//! Each function loads a fresh collection from the [`RecordSource`],
//! narrows it with the filter engine and runs one aggregation. Nothing is
//! cached between calls.

use crime_heatmap_analytics_models::{
    BeatAnalysis, BeatAnalysisParams, DataFrequencyParams, DetailsParams, DetailsResult,
    DetailsSummary, Diagnostics, DistrictUnitParams, FieldFrequencyTables, FilterCriteria,
    HourBucket, MonthBucket, WeekBucket,
};
use crime_heatmap_records::RecordSource;
use crime_heatmap_records_models::{FieldMatch, RecordCollection};

use crate::AnalyticsError;
use crate::ranking::{DEFAULT_LIMIT, top_locations, top_occurrences};
use crate::{beat, buckets, filter, frequency};

/// Equality pre-filter for the source, or `None` for an empty value.
fn pre_filter(field: &str, value: &str) -> Option<FieldMatch> {
    (!value.is_empty()).then(|| FieldMatch::new(field, value))
}

fn describe_scope(district: &str, unit: &str) -> String {
    match (district.is_empty(), unit.is_empty()) {
        (true, true) => "all districts".to_string(),
        (false, true) => format!("district '{district}'"),
        (true, false) => format!("unit '{unit}'"),
        (false, false) => format!("unit '{unit}' of district '{district}'"),
    }
}

fn report_skips(operation: &str, diagnostics: &Diagnostics) {
    let skipped = diagnostics.total_skipped();
    if skipped > 0 {
        log::warn!(
            "{operation}: skipped {skipped} of {} records ({:?})",
            diagnostics.records_scanned,
            diagnostics.skipped
        );
    }
}

/// Loads the records of one district/unit pair.
async fn load_scoped(
    source: &dyn RecordSource,
    district: &str,
    unit: &str,
) -> Result<RecordCollection, AnalyticsError> {
    let schema = source.schema();
    let roles = schema.roles();

    let records = source
        .load(pre_filter(&roles.district, district).as_ref())
        .await?;
    let criteria = FilterCriteria::new()
        .with_equal(&roles.district, district)
        .with_equal(&roles.unit, unit);

    let filtered = filter::filter(records, &criteria, schema);
    log::debug!(
        "{} records in {}",
        filtered.value.len(),
        describe_scope(district, unit)
    );
    Ok(filtered.value)
}

/// Lists every district name in the dataset, in first-seen order.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn list_districts(source: &dyn RecordSource) -> Result<Vec<String>, AnalyticsError> {
    let records = source.load(None).await?;
    Ok(frequency::unique_values(
        records.as_slice(),
        &source.schema().roles().district,
    ))
}

/// Lists the units of `district`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn list_units(
    source: &dyn RecordSource,
    district: &str,
) -> Result<Vec<String>, AnalyticsError> {
    let roles = source.schema().roles();
    let records = source
        .load(pre_filter(&roles.district, district).as_ref())
        .await?;
    Ok(frequency::unique_values(records.as_slice(), &roles.unit))
}

/// Lists the beats of `unit`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn list_beats(
    source: &dyn RecordSource,
    unit: &str,
) -> Result<Vec<String>, AnalyticsError> {
    let roles = source.schema().roles();
    let records = source.load(pre_filter(&roles.unit, unit).as_ref()).await?;
    Ok(frequency::unique_values(records.as_slice(), &roles.beat))
}

/// Returns every record of `beat`, unaggregated.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn records_by_beat(
    source: &dyn RecordSource,
    beat: &str,
) -> Result<RecordCollection, AnalyticsError> {
    let roles = source.schema().roles();
    Ok(source.load(pre_filter(&roles.beat, beat).as_ref()).await?)
}

/// Incidents per hour of day for a district/unit pair.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn crime_by_hour(
    source: &dyn RecordSource,
    params: &DistrictUnitParams,
) -> Result<Vec<HourBucket>, AnalyticsError> {
    let records = load_scoped(source, &params.district, &params.unit).await?;
    let out = buckets::by_hour(records.as_slice(), source.schema().roles());
    report_skips("crime_by_hour", &out.diagnostics);
    Ok(out.value)
}

/// Incidents per month for a district/unit pair.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn crime_by_month(
    source: &dyn RecordSource,
    params: &DistrictUnitParams,
) -> Result<Vec<MonthBucket>, AnalyticsError> {
    let records = load_scoped(source, &params.district, &params.unit).await?;
    let out = buckets::by_month(records.as_slice(), source.schema().roles());
    report_skips("crime_by_month", &out.diagnostics);
    Ok(out.value)
}

/// Incidents per week of the year for a district/unit pair.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn crime_by_week(
    source: &dyn RecordSource,
    params: &DistrictUnitParams,
) -> Result<Vec<WeekBucket>, AnalyticsError> {
    let records = load_scoped(source, &params.district, &params.unit).await?;
    let out = buckets::by_week(records.as_slice(), source.schema().roles());
    report_skips("crime_by_week", &out.diagnostics);
    Ok(out.value)
}

fn validate_month_range(start: u32, end: u32) -> Result<(), AnalyticsError> {
    if !(1..=12).contains(&start) || !(1..=12).contains(&end) {
        return Err(AnalyticsError::InvalidRequest {
            message: format!("months must be between 1 and 12, got {start}..{end}"),
        });
    }
    if start > end {
        return Err(AnalyticsError::InvalidRequest {
            message: format!("start month {start} is after end month {end}"),
        });
    }
    Ok(())
}

/// Top locations, crime groups, crime types and months for an optional
/// district/unit over a month range, together with the matching records.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidRequest`] if the month range is not
/// within 1-12 or is reversed, or [`AnalyticsError::Source`] if the source
/// cannot be loaded.
pub async fn details(
    source: &dyn RecordSource,
    params: &DetailsParams,
) -> Result<DetailsResult, AnalyticsError> {
    validate_month_range(params.start_month, params.end_month)?;

    let schema = source.schema();
    let roles = schema.roles();
    let district = params.district.as_deref().unwrap_or_default();
    let unit = params.unit.as_deref().unwrap_or_default();

    let records = source
        .load(pre_filter(&roles.district, district).as_ref())
        .await?;
    let criteria = FilterCriteria::new()
        .with_equal(&roles.district, district)
        .with_equal(&roles.unit, unit)
        .with_month_range(params.start_month, params.end_month);

    let filtered = filter::filter(records, &criteria, schema);
    report_skips("details", &filtered.diagnostics);

    let all_data = filtered.value;
    let rows = all_data.as_slice();

    log::debug!(
        "details: {} records in {} for months {}..={}",
        rows.len(),
        describe_scope(district, unit),
        params.start_month,
        params.end_month
    );

    let details = DetailsSummary {
        top_lat_long: top_locations(rows, roles, DEFAULT_LIMIT),
        top_crime_groups: top_occurrences(rows, &roles.category_group, DEFAULT_LIMIT),
        top_crimes: top_occurrences(rows, &roles.category, DEFAULT_LIMIT),
        top_months: top_occurrences(rows, &roles.month, DEFAULT_LIMIT),
    };

    Ok(DetailsResult { details, all_data })
}

/// Value census of every field, optionally restricted to a district and
/// unit.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn data_frequency(
    source: &dyn RecordSource,
    params: &DataFrequencyParams,
) -> Result<FieldFrequencyTables, AnalyticsError> {
    let district = params.selected_district.as_deref().unwrap_or_default();
    let unit = params.selected_unit.as_deref().unwrap_or_default();

    let records = load_scoped(source, district, unit).await?;
    Ok(frequency::build_frequency_tables(
        records.as_slice(),
        source.schema(),
    ))
}

/// Field summaries, narrative and hotspots for one beat.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the source cannot be loaded.
pub async fn beat_analysis(
    source: &dyn RecordSource,
    params: &BeatAnalysisParams,
) -> Result<BeatAnalysis, AnalyticsError> {
    let records = records_by_beat(source, &params.beat).await?;
    log::debug!(
        "beat_analysis: {} records in beat '{}'",
        records.len(),
        params.beat
    );
    Ok(beat::analyze_beat(
        records.as_slice(),
        source.schema(),
        params,
    ))
}

#[cfg(test)]
mod tests {
    use crime_heatmap_records::memory::InMemoryRecordSource;
    use crime_heatmap_records_models::Record;

    use super::*;
    use crate::fixtures::{collection, incident, record, schema};

    fn at_beat(r: Record, beat: &str) -> Record {
        r.iter()
            .map(|(k, v)| (k, if k == "beat_name" { beat } else { v }))
            .collect()
    }

    fn source() -> InMemoryRecordSource {
        let records = vec![
            at_beat(incident("Mysuru", "Town PS", "2023-01-05", "09:30", "Theft"), "B1"),
            at_beat(incident("Mysuru", "Town PS", "2023-01-20", "09:10", "Theft"), "B1"),
            at_beat(incident("Mysuru", "Town PS", "2023-03-02", "22:00", "Assault"), "B2"),
            at_beat(incident("Mysuru", "Rural PS", "2023-02-11", "", "Robbery"), "B3"),
            at_beat(incident("Hassan", "Town PS", "2023-06-01", "14:00", "Theft"), "B4"),
            at_beat(incident("Hassan", "Belur PS", "", "08:00", "Cheating"), "B5"),
        ];
        InMemoryRecordSource::new(collection(records), schema())
    }

    fn scope(district: &str, unit: &str) -> DistrictUnitParams {
        DistrictUnitParams {
            district: district.to_string(),
            unit: unit.to_string(),
        }
    }

    #[tokio::test]
    async fn lists_drill_down_levels() {
        let source = source();
        assert_eq!(
            list_districts(&source).await.unwrap(),
            vec!["Mysuru", "Hassan"]
        );
        assert_eq!(
            list_units(&source, "Mysuru").await.unwrap(),
            vec!["Town PS", "Rural PS"]
        );
        assert_eq!(
            list_beats(&source, "Town PS").await.unwrap(),
            vec!["B1", "B2", "B4"]
        );
        assert!(list_units(&source, "Kodagu").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn returns_raw_records_of_a_beat() {
        let records = records_by_beat(&source(), "B1").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.get("beat_name") == Some("B1")));
    }

    #[tokio::test]
    async fn buckets_one_district_unit() {
        let source = source();
        let hours = crime_by_hour(&source, &scope("Mysuru", "Town PS"))
            .await
            .unwrap();
        assert_eq!(hours.len(), 24);
        assert_eq!(hours[9].count, 2);
        assert_eq!(hours[9].top_crimes, "Theft (2)");
        assert_eq!(hours[22].count, 1);

        let months = crime_by_month(&source, &scope("Mysuru", "Town PS"))
            .await
            .unwrap();
        let months: Vec<_> = months.iter().map(|m| (m.month.as_str(), m.count)).collect();
        assert_eq!(months, vec![("01", 2), ("03", 1)]);

        let weeks = crime_by_week(&source, &scope("Mysuru", "Town PS"))
            .await
            .unwrap();
        let weeks: Vec<_> = weeks.iter().map(|w| (w.week, w.count)).collect();
        assert_eq!(weeks, vec![(1, 1), (3, 1), (9, 1)]);
    }

    #[tokio::test]
    async fn unknown_scope_yields_empty_buckets() {
        let hours = crime_by_hour(&source(), &scope("Kodagu", "Town PS"))
            .await
            .unwrap();
        assert_eq!(hours.len(), 24);
        assert!(hours.iter().all(|h| h.count == 0));
    }

    #[tokio::test]
    async fn details_ranks_within_month_range() {
        let params = DetailsParams {
            district: Some("Mysuru".to_string()),
            unit: Some(String::new()),
            start_month: 1,
            end_month: 2,
        };
        let result = details(&source(), &params).await.unwrap();

        assert_eq!(result.all_data.len(), 3);
        assert_eq!(result.details.top_crimes[0].value, "Theft");
        assert_eq!(result.details.top_crimes[0].count, 2);
        assert_eq!(result.details.top_months[0].value, "01");
        assert_eq!(result.details.top_lat_long.len(), 1);
        assert_eq!(
            result.details.top_lat_long[0].longitude.as_deref(),
            Some("76.64")
        );

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["details"]["topCrimeGroups"][0]["freq"].is_number());
        assert!(json["allData"].is_array());
    }

    #[tokio::test]
    async fn details_rejects_bad_month_ranges() {
        for (start, end) in [(0, 3), (2, 13), (5, 4)] {
            let params = DetailsParams {
                district: None,
                unit: None,
                start_month: start,
                end_month: end,
            };
            let err = details(&source(), &params).await.unwrap_err();
            assert!(matches!(err, AnalyticsError::InvalidRequest { .. }));
        }
    }

    #[tokio::test]
    async fn details_without_scope_skips_undated_records() {
        let params = DetailsParams {
            district: None,
            unit: None,
            start_month: 1,
            end_month: 12,
        };
        let result = details(&source(), &params).await.unwrap();
        assert_eq!(result.all_data.len(), 5);
    }

    #[tokio::test]
    async fn data_frequency_counts_every_field() {
        let source = source();
        let all = data_frequency(&source, &DataFrequencyParams::default())
            .await
            .unwrap();
        assert_eq!(all.get("district_name").unwrap().total(), 6);
        assert_eq!(all.get("district_name").unwrap().get("Hassan"), 2);

        let params = DataFrequencyParams {
            selected_district: Some("Mysuru".to_string()),
            selected_unit: Some("Town PS".to_string()),
        };
        let scoped = data_frequency(&source, &params).await.unwrap();
        assert_eq!(scoped.get("Crime_Type").unwrap().total(), 3);
    }

    #[tokio::test]
    async fn beat_analysis_summarises_one_beat() {
        let params = BeatAnalysisParams {
            district: "Mysuru".to_string(),
            unit: "Town PS".to_string(),
            beat: "B1".to_string(),
        };
        let analysis = beat_analysis(&source(), &params).await.unwrap();
        assert_eq!(analysis.total_records, 2);
        assert_eq!(analysis.hotspots.len(), 1);
        assert_eq!(analysis.hotspots[0].count, 2);
        assert!(analysis.analysis_text.starts_with(
            "1) In the beat of Town PS unit of Mysuru district"
        ));
    }

    #[tokio::test]
    async fn works_with_sparse_records() {
        let source = InMemoryRecordSource::new(
            collection(vec![record(&[("district_name", "Mysuru")])]),
            schema(),
        );
        assert_eq!(list_districts(&source).await.unwrap(), vec!["Mysuru"]);
        assert!(list_units(&source, "Mysuru").await.unwrap().is_empty());
    }
}
