//! Small hand-built datasets shared by the unit tests.

use crime_heatmap_records_models::{FieldRoles, FieldSchema, Record, RecordCollection};

pub const FIELDS: &[&str] = &[
    "district_name",
    "unitname",
    "beat_name",
    "Offence_From_Date_only",
    "Offence_From_Time_only",
    "Crime_Type",
    "crime_group_name",
    "latitude",
    "longitude",
    "month",
    "place_of_offence",
];

pub fn schema() -> FieldSchema {
    FieldSchema::new(
        FIELDS.iter().map(ToString::to_string).collect(),
        FieldRoles {
            district: "district_name".to_string(),
            unit: "unitname".to_string(),
            beat: "beat_name".to_string(),
            date: "Offence_From_Date_only".to_string(),
            time: "Offence_From_Time_only".to_string(),
            category: "Crime_Type".to_string(),
            category_group: "crime_group_name".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            month: "month".to_string(),
        },
        vec![
            "place_of_offence".to_string(),
            "Crime_Type".to_string(),
        ],
    )
    .unwrap()
}

pub fn record(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().copied().collect()
}

/// An incident with every schema field present; `date`, `time` and
/// `crime` may be empty strings.
pub fn incident(district: &str, unit: &str, date: &str, time: &str, crime: &str) -> Record {
    record(&[
        ("district_name", district),
        ("unitname", unit),
        ("beat_name", "B1"),
        ("Offence_From_Date_only", date),
        ("Offence_From_Time_only", time),
        ("Crime_Type", crime),
        ("crime_group_name", "GROUP"),
        ("latitude", "12.30"),
        ("longitude", "76.64"),
        ("month", month_of(date)),
        ("place_of_offence", "Road"),
    ])
}

fn month_of(date: &str) -> &str {
    date.split('-').nth(1).unwrap_or("")
}

pub fn collection(records: Vec<Record>) -> RecordCollection {
    RecordCollection::new(records)
}
