#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime heatmap drill-down queries.
//!
//! Serves the district -> unit -> beat listings, the hourly, monthly and
//! weekly trend buckets, the details summary, the full field census and
//! the beat analysis as JSON. Every request reloads the dataset from the
//! configured CSV file.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crime_heatmap_records::csv_file::CsvRecordSource;
use crime_heatmap_records::definition::load_definition;
use crime_heatmap_records::{RecordSource, SourceError};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default location of the incident CSV.
pub const DEFAULT_DATASET_PATH: &str = "dataset/merged_data_cleaned.csv";

/// Where to listen and what to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Incident CSV file.
    pub dataset_path: PathBuf,
    /// Dataset definition TOML; the built-in definition when `None`.
    pub definition_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            definition_path: None,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `DATASET_PATH` and `DATASET_DEFINITION`,
    /// falling back to the defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            dataset_path: lookup("DATASET_PATH").map_or(defaults.dataset_path, PathBuf::from),
            definition_path: lookup("DATASET_DEFINITION")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Builds the CSV record source described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the dataset definition cannot be read or
    /// is invalid.
    pub async fn open_source(&self) -> Result<CsvRecordSource, SourceError> {
        let definition = load_definition(self.definition_path.as_deref()).await?;
        log::info!("Using dataset definition '{}'", definition.id);
        CsvRecordSource::new(&self.dataset_path, &definition)
    }
}

/// Shared application state.
pub struct AppState {
    /// Where each request loads its records from.
    pub source: Arc<dyn RecordSource>,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/districts", web::get().to(handlers::districts))
            .route("/units/{district}", web::get().to(handlers::units))
            .route("/beats/{unit}", web::get().to(handlers::beats))
            .route("/data-by-beat/{beat}", web::get().to(handlers::data_by_beat))
            .route(
                "/crime-by-time/{district}/{unit}",
                web::get().to(handlers::crime_by_time),
            )
            .route(
                "/crime-by-month/{district}/{unit}",
                web::get().to(handlers::crime_by_month),
            )
            .route(
                "/crime-by-week/{district}/{unit}",
                web::get().to(handlers::crime_by_week),
            )
            .route("/details", web::post().to(handlers::details))
            .route("/data-frequency", web::post().to(handlers::data_frequency))
            .route("/beat-analysis", web::post().to(handlers::beat_analysis)),
    );
}

/// Starts the crime heatmap API server.
///
/// Opens the dataset described by `config` and serves the API until the
/// server is stopped. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the dataset definition cannot be
/// loaded, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Loading dataset definition...");
    let source = config.open_source().await.map_err(std::io::Error::other)?;
    log::info!("Serving records from {}", source.describe());

    if !source.path().exists() {
        log::warn!(
            "Dataset {} does not exist yet; requests will fail until it does",
            source.path().display()
        );
    }

    let state = web::Data::new(AppState {
        source: Arc::new(source),
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use crime_heatmap_records::definition::{DEFAULT_DATASET_ID, builtin_definition};
    use crime_heatmap_records::memory::InMemoryRecordSource;
    use crime_heatmap_records_models::{Record, RecordCollection};
    use serde_json::{Value, json};

    use super::*;

    fn record(district: &str, unit: &str, beat: &str, date: &str, time: &str) -> Record {
        [
            ("district_name", district),
            ("unitname", unit),
            ("beat_name", beat),
            ("Offence_From_Date_only", date),
            ("Offence_From_Time_only", time),
            ("Crime_Type", "Theft"),
            ("crime_group_name", "PROPERTY"),
            ("latitude", "12.30"),
            ("longitude", "76.64"),
            ("month", "1"),
            ("place_of_offence", "Road"),
        ]
        .into_iter()
        .collect()
    }

    fn memory_state() -> web::Data<AppState> {
        let schema = builtin_definition(DEFAULT_DATASET_ID)
            .unwrap()
            .unwrap()
            .schema()
            .unwrap();
        let records: RecordCollection = vec![
            record("Mysuru", "Town PS", "B1", "2023-01-05", "09:30"),
            record("Mysuru", "Town PS", "B1", "2023-01-09", "09:05"),
            record("Mysuru", "Rural PS", "B2", "2023-02-11", "18:00"),
        ]
        .into_iter()
        .collect();
        web::Data::new(AppState {
            source: Arc::new(InMemoryRecordSource::new(records, schema)),
        })
    }

    fn missing_file_state() -> web::Data<AppState> {
        let definition = builtin_definition(DEFAULT_DATASET_ID).unwrap().unwrap();
        let source = CsvRecordSource::new(
            std::path::Path::new("/nonexistent/heatmap/data.csv"),
            &definition,
        )
        .unwrap();
        web::Data::new(AppState {
            source: Arc::new(source),
        })
    }

    #[::core::prelude::v1::test]
    fn config_reads_overrides_and_defaults() {
        let env: HashMap<&str, &str> = [("PORT", "8081"), ("DATASET_PATH", "/data/fir.csv")]
            .into_iter()
            .collect();
        let config = ServerConfig::from_lookup(|k| env.get(k).map(ToString::to_string));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.port, 8081);
        assert_eq!(config.dataset_path, PathBuf::from("/data/fir.csv"));
        assert_eq!(config.definition_path, None);

        let bad_port = ServerConfig::from_lookup(|k| (k == "PORT").then(|| "http".to_string()));
        assert_eq!(bad_port.port, DEFAULT_PORT);
    }

    #[actix_web::test]
    async fn serves_drill_down_listings() {
        let app =
            test::init_service(App::new().app_data(memory_state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/districts").to_request();
        let body: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, vec!["Mysuru"]);

        let req = test::TestRequest::get()
            .uri("/api/units/Mysuru")
            .to_request();
        let body: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, vec!["Town PS", "Rural PS"]);

        let req = test::TestRequest::get()
            .uri("/api/beats/Town%20PS")
            .to_request();
        let body: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, vec!["B1"]);

        let req = test::TestRequest::get()
            .uri("/api/data-by-beat/B2")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["unitname"], "Rural PS");
    }

    #[actix_web::test]
    async fn serves_trend_buckets() {
        let app =
            test::init_service(App::new().app_data(memory_state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/crime-by-time/Mysuru/Town%20PS")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 24);
        assert_eq!(body[9], json!({"hour": "9:00", "count": 2, "topCrimes": "Theft (2)"}));

        let req = test::TestRequest::get()
            .uri("/api/crime-by-month/Mysuru/Town%20PS")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, vec![json!({"month": "01", "count": 2, "topCrimes": "Theft (2)"})]);

        let req = test::TestRequest::get()
            .uri("/api/crime-by-week/Mysuru/Town%20PS")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        let weeks: Vec<_> = body.iter().map(|w| w["week"].as_u64().unwrap()).collect();
        assert_eq!(weeks, vec![1, 2]);
    }

    #[actix_web::test]
    async fn serves_details_and_census() {
        let app =
            test::init_service(App::new().app_data(memory_state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/details")
            .set_json(json!({"district": "Mysuru", "unit": "", "startMonth": 1, "endMonth": 1}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["allData"].as_array().unwrap().len(), 2);
        assert_eq!(
            body["details"]["topCrimes"],
            json!([{"value": "Theft", "freq": 2}])
        );

        let req = test::TestRequest::post()
            .uri("/api/data-frequency")
            .set_json(json!({"selectedDistrict": "Mysuru", "selectedUnit": "Rural PS"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["beat_name"], json!({"B2": 1}));

        let req = test::TestRequest::post()
            .uri("/api/beat-analysis")
            .set_json(json!({"district": "Mysuru", "unit": "Town PS", "beat": "B1"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalRecords"], 2);
        assert_eq!(body["hotspots"][0]["count"], 2);
    }

    #[actix_web::test]
    async fn rejects_bad_month_range() {
        let app =
            test::init_service(App::new().app_data(memory_state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/details")
            .set_json(json!({"startMonth": 6, "endMonth": 2}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("after end month"));
    }

    #[actix_web::test]
    async fn unavailable_source_is_a_server_error() {
        let app =
            test::init_service(App::new().app_data(missing_file_state()).configure(configure))
                .await;

        let req = test::TestRequest::get().uri("/api/districts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["dataset"], "csv:/nonexistent/heatmap/data.csv");
    }
}
