//! Per-beat field summaries, narrative text and map hotspots.

use std::collections::HashMap;

use crime_heatmap_analytics_models::{
    BeatAnalysis, BeatAnalysisParams, FieldSummary, FrequencyTable, Hotspot, RankedShare,
};
use crime_heatmap_records_models::{FieldRoles, FieldSchema, Record};

use crate::ranking::OrderedCounter;

/// Values listed per field and hotspots per beat.
pub const TOP_LIMIT: usize = 3;

/// Literal the source data uses for an unknown value.
const NULL_VALUE: &str = "null";

/// Summarises every analysis field of `records`, which are expected to
/// belong to the beat named in `params`.
#[must_use]
pub fn analyze_beat(
    records: &[Record],
    schema: &FieldSchema,
    params: &BeatAnalysisParams,
) -> BeatAnalysis {
    let fields: Vec<FieldSummary> = schema
        .analysis_fields()
        .iter()
        .map(|field| summarize_field(records, field))
        .collect();

    let analysis_text = fields
        .iter()
        .enumerate()
        .map(|(i, summary)| narrative_line(i + 1, summary, params))
        .collect::<Vec<_>>()
        .join("\n");

    BeatAnalysis {
        district: params.district.clone(),
        unit: params.unit.clone(),
        beat: params.beat.clone(),
        total_records: records.len() as u64,
        hotspots: hotspots(records, schema.roles(), TOP_LIMIT),
        fields,
        analysis_text,
    }
}

/// Census and top values of one field, leaving out the literal `"null"`.
#[must_use]
pub fn summarize_field(records: &[Record], field: &str) -> FieldSummary {
    let mut counts = FrequencyTable::default();
    let mut ordered = OrderedCounter::new();

    for value in records.iter().filter_map(|r| r.get(field)) {
        if value != NULL_VALUE {
            counts.increment(value);
            ordered.add(value);
        }
    }

    let total = ordered.total();
    let top = ordered
        .into_ranked(TOP_LIMIT)
        .into_iter()
        .map(|v| RankedShare {
            percentage: v.count * 100 / total,
            value: v.value,
            count: v.count,
        })
        .collect();

    FieldSummary {
        field: field.to_string(),
        total,
        counts,
        top,
    }
}

/// `"place_of_offence"` -> `"place of offence"`.
fn display_name(field: &str) -> String {
    field.replace('_', " ").to_lowercase()
}

fn narrative_line(n: usize, summary: &FieldSummary, params: &BeatAnalysisParams) -> String {
    let top = summary
        .top
        .iter()
        .enumerate()
        .map(|(i, share)| {
            format!(
                "{}. {}: {} ({}% of total)",
                i + 1,
                share.value,
                share.count,
                share.percentage
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        "{n}) In the beat of {} unit of {} district, the top 3 frequencies in {} are: {top}.",
        params.unit,
        params.district,
        display_name(&summary.field),
    )
}

fn usable_coordinate(value: &str) -> bool {
    !value.is_empty() && value != NULL_VALUE
}

/// The `limit` most reported coordinate pairs.
///
/// Each pair keeps the crime type of the first incident seen there. Pairs
/// among the top `limit` whose coordinates are not numeric are dropped
/// rather than replaced.
#[must_use]
pub fn hotspots(records: &[Record], roles: &FieldRoles, limit: usize) -> Vec<Hotspot> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut pairs: Vec<((&str, &str), &str, u64)> = Vec::new();

    for record in records {
        let (Some(lat), Some(lon)) = (record.get(&roles.latitude), record.get(&roles.longitude))
        else {
            continue;
        };
        if !usable_coordinate(lat) || !usable_coordinate(lon) {
            continue;
        }
        if let Some(&i) = index.get(&(lat, lon)) {
            pairs[i].2 += 1;
        } else {
            index.insert((lat, lon), pairs.len());
            let crime_type = record.get(&roles.category).unwrap_or_default();
            pairs.push(((lat, lon), crime_type, 1));
        }
    }

    pairs.sort_by(|a, b| b.2.cmp(&a.2));

    pairs
        .into_iter()
        .take(limit)
        .filter_map(|((lat, lon), crime_type, count)| {
            let latitude = lat.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
            let longitude = lon.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
            Some(Hotspot {
                latitude,
                longitude,
                crime_type: crime_type.to_string(),
                count,
            })
        })
        .collect()
}
