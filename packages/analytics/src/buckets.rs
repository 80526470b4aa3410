//! Time-series bucketing by hour of day, month and week of year.
//!
//! Every bucket carries an incident count and the three most common crime
//! types inside it. Records whose time or date cannot be placed in a
//! bucket are skipped and counted in the returned [`Diagnostics`].

use std::collections::BTreeMap;

use crime_heatmap_analytics_models::{
    Diagnostics, HourBucket, MonthBucket, SkipReason, ValueCount, WeekBucket, WithDiagnostics,
};
use crime_heatmap_records_models::{FieldRoles, Record};

use crate::dates;
use crate::ranking::OrderedCounter;

/// Crime types listed per bucket.
pub const TOP_CATEGORY_LIMIT: usize = 3;

/// Stand-in for an empty crime type.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Text used when a bucket holds no incidents.
pub const NO_DATA: &str = "No data";

#[derive(Debug, Default)]
struct BucketTally {
    count: u64,
    categories: OrderedCounter,
}

impl BucketTally {
    fn add(&mut self, category: &str) {
        self.count += 1;
        self.categories.add(category);
    }

    fn top_categories(&self) -> String {
        format_top_categories(&self.categories.ranked(TOP_CATEGORY_LIMIT))
    }
}

/// Formats ranked categories as `"Theft (4), Assault (2)"`, or
/// [`NO_DATA`] when there are none.
#[must_use]
pub fn format_top_categories(top: &[ValueCount]) -> String {
    if top.is_empty() {
        return NO_DATA.to_string();
    }
    top.iter()
        .map(|v| format!("{} ({})", v.value, v.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn category_of<'a>(record: &'a Record, field: &str) -> &'a str {
    record
        .get(field)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(UNKNOWN_CATEGORY)
}

fn tally_by<K: Ord>(
    records: &[Record],
    roles: &FieldRoles,
    key: impl Fn(&Record) -> Result<K, SkipReason>,
) -> (BTreeMap<K, BucketTally>, Diagnostics) {
    let mut tallies: BTreeMap<K, BucketTally> = BTreeMap::new();
    let mut diagnostics = Diagnostics::default();

    for record in records {
        diagnostics.scanned();
        match key(record) {
            Ok(k) => tallies
                .entry(k)
                .or_default()
                .add(category_of(record, &roles.category)),
            Err(reason) => {
                log::debug!("Skipping record while bucketing: {reason}");
                diagnostics.skip(reason);
            }
        }
    }

    (tallies, diagnostics)
}

fn hour_key(record: &Record, roles: &FieldRoles) -> Result<u32, SkipReason> {
    let time = record
        .non_empty(&roles.time)
        .ok_or(SkipReason::MissingTime)?;
    dates::hour_of_day(time).ok_or(SkipReason::UnparseableTime)
}

fn month_key(record: &Record, roles: &FieldRoles) -> Result<(u32, String), SkipReason> {
    let date = record
        .non_empty(&roles.date)
        .ok_or(SkipReason::MissingDate)?;
    let key = dates::month_key(date).ok_or(SkipReason::UnparseableDate)?;
    let month = dates::parse_month(key).ok_or(SkipReason::UnparseableDate)?;
    Ok((month, key.to_string()))
}

fn week_key(record: &Record, roles: &FieldRoles) -> Result<u32, SkipReason> {
    let date = record
        .non_empty(&roles.date)
        .ok_or(SkipReason::MissingDate)?;
    dates::parse_utc_date(date)
        .map(dates::week_of_year)
        .ok_or(SkipReason::UnparseableDate)
}

/// Incident counts for each hour of the day.
///
/// Always returns 24 buckets, `"0:00"` through `"23:00"`, even for empty
/// input.
#[must_use]
pub fn by_hour(records: &[Record], roles: &FieldRoles) -> WithDiagnostics<Vec<HourBucket>> {
    let (tallies, diagnostics) = tally_by(records, roles, |r| hour_key(r, roles));

    let value = (0..24)
        .map(|hour| {
            let (count, top_crimes) = tallies
                .get(&hour)
                .map_or_else(|| (0, NO_DATA.to_string()), |t| (t.count, t.top_categories()));
            HourBucket {
                hour: format!("{hour}:00"),
                count,
                top_crimes,
            }
        })
        .collect();

    WithDiagnostics { value, diagnostics }
}

/// Incident counts per month present in the data, ordered by month
/// number.
#[must_use]
pub fn by_month(records: &[Record], roles: &FieldRoles) -> WithDiagnostics<Vec<MonthBucket>> {
    let (tallies, diagnostics) = tally_by(records, roles, |r| month_key(r, roles));

    let value = tallies
        .into_iter()
        .map(|((_, month), tally)| MonthBucket {
            top_crimes: tally.top_categories(),
            count: tally.count,
            month,
        })
        .collect();

    WithDiagnostics { value, diagnostics }
}

/// Incident counts per week of the year present in the data, ascending.
#[must_use]
pub fn by_week(records: &[Record], roles: &FieldRoles) -> WithDiagnostics<Vec<WeekBucket>> {
    let (tallies, diagnostics) = tally_by(records, roles, |r| week_key(r, roles));

    let value = tallies
        .into_iter()
        .map(|(week, tally)| WeekBucket {
            week,
            count: tally.count,
            top_crimes: tally.top_categories(),
        })
        .collect();

    WithDiagnostics { value, diagnostics }
}
