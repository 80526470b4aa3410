//! HTTP handler functions for the crime heatmap API.

use actix_web::{HttpResponse, web};
use crime_heatmap_analytics::{AnalyticsError, tools};
use crime_heatmap_analytics_models::{
    BeatAnalysisParams, DataFrequencyParams, DetailsParams, DistrictUnitParams,
};
use crime_heatmap_server_models::{ApiError, ApiHealth};
use serde::Serialize;

use crate::AppState;

/// Turns a tool result into a JSON response.
///
/// Invalid requests map to `400`, everything else to `500`.
fn respond<T: Serialize>(action: &str, result: Result<T, AnalyticsError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(AnalyticsError::InvalidRequest { message }) => {
            log::warn!("Rejected request to {action}: {message}");
            HttpResponse::BadRequest().json(ApiError::new(message))
        }
        Err(e) => {
            log::error!("Failed to {action}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(format!("Failed to {action}: {e}")))
        }
    }
}

fn district_unit(path: web::Path<(String, String)>) -> DistrictUnitParams {
    let (district, unit) = path.into_inner();
    DistrictUnitParams { district, unit }
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        dataset: state.source.describe(),
    })
}

/// `GET /api/districts`
pub async fn districts(state: web::Data<AppState>) -> HttpResponse {
    respond(
        "list districts",
        tools::list_districts(state.source.as_ref()).await,
    )
}

/// `GET /api/units/{district}`
pub async fn units(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    respond(
        "list units",
        tools::list_units(state.source.as_ref(), &path).await,
    )
}

/// `GET /api/beats/{unit}`
pub async fn beats(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    respond(
        "list beats",
        tools::list_beats(state.source.as_ref(), &path).await,
    )
}

/// `GET /api/data-by-beat/{beat}`
///
/// Returns the raw records of one beat.
pub async fn data_by_beat(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    respond(
        "load beat records",
        tools::records_by_beat(state.source.as_ref(), &path).await,
    )
}

/// `GET /api/crime-by-time/{district}/{unit}`
///
/// Always 24 hourly buckets.
pub async fn crime_by_time(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let params = district_unit(path);
    respond(
        "bucket crimes by hour",
        tools::crime_by_hour(state.source.as_ref(), &params).await,
    )
}

/// `GET /api/crime-by-month/{district}/{unit}`
pub async fn crime_by_month(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let params = district_unit(path);
    respond(
        "bucket crimes by month",
        tools::crime_by_month(state.source.as_ref(), &params).await,
    )
}

/// `GET /api/crime-by-week/{district}/{unit}`
pub async fn crime_by_week(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let params = district_unit(path);
    respond(
        "bucket crimes by week",
        tools::crime_by_week(state.source.as_ref(), &params).await,
    )
}

/// `POST /api/details`
///
/// Top locations, crime groups, crimes and months over a month range.
pub async fn details(
    state: web::Data<AppState>,
    body: web::Json<DetailsParams>,
) -> HttpResponse {
    respond(
        "summarize details",
        tools::details(state.source.as_ref(), &body).await,
    )
}

/// `POST /api/data-frequency`
pub async fn data_frequency(
    state: web::Data<AppState>,
    body: web::Json<DataFrequencyParams>,
) -> HttpResponse {
    respond(
        "count field values",
        tools::data_frequency(state.source.as_ref(), &body).await,
    )
}

/// `POST /api/beat-analysis`
pub async fn beat_analysis(
    state: web::Data<AppState>,
    body: web::Json<BeatAnalysisParams>,
) -> HttpResponse {
    respond(
        "analyze beat",
        tools::beat_analysis(state.source.as_ref(), &body).await,
    )
}
