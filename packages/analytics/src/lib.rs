#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record filtering and aggregation engine for crime drill-down queries.
//!
//! The engine modules ([`filter`], [`ranking`], [`buckets`], [`frequency`],
//! [`beat`]) are pure functions over borrowed records. [`tools`] wires them
//! to a [`crime_heatmap_records::RecordSource`]: each tool loads a fresh
//! collection, narrows it, and runs exactly one aggregation.

pub mod beat;
pub mod buckets;
pub mod dates;
pub mod filter;
pub mod frequency;
pub mod ranking;
pub mod tools;

#[cfg(test)]
pub(crate) mod fixtures;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The record source could not supply records.
    #[error("Source error: {0}")]
    Source(#[from] crime_heatmap_records::SourceError),

    /// The request parameters are out of range.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what went wrong.
        message: String,
    },
}
