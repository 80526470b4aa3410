#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the crime heatmap.
//!
//! Each subcommand runs one drill-down query against the dataset and
//! prints the result as pretty JSON. `serve` starts the API server;
//! running without a subcommand starts it interactively.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crime_heatmap_analytics::tools;
use crime_heatmap_analytics_models::{
    BeatAnalysisParams, DataFrequencyParams, DetailsParams, DistrictUnitParams, TimeGranularity,
};
use crime_heatmap_records::RecordSource;
use crime_heatmap_server::ServerConfig;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "crime_heatmap", about = "Crime incident drill-down queries")]
struct Cli {
    /// Incident CSV file (overrides `DATASET_PATH`)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Dataset definition TOML (overrides `DATASET_DEFINITION`)
    #[arg(long, global = true)]
    definition: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind_addr: Option<String>,
        /// Port to bind (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
    #[command(flatten)]
    Query(QueryCommand),
}

/// Commands that print query results.
#[derive(Subcommand)]
enum QueryCommand {
    /// List every district
    Districts,
    /// List the units of a district
    Units {
        /// District name
        district: String,
    },
    /// List the beats of a unit
    Beats {
        /// Unit name
        unit: String,
    },
    /// Print the raw records of a beat
    Beat {
        /// Beat name
        beat: String,
    },
    /// Incident counts over time for a district and unit
    Trend {
        /// District name
        district: String,
        /// Unit name
        unit: String,
        /// Bucket width: `hourly`, `monthly` or `weekly`
        #[arg(long, default_value = "hourly")]
        granularity: TimeGranularity,
    },
    /// Top locations, crime groups, crimes and months over a month range
    Details {
        /// District name (all districts if omitted)
        #[arg(long)]
        district: Option<String>,
        /// Unit name (all units if omitted)
        #[arg(long)]
        unit: Option<String>,
        /// First month included (1-12)
        #[arg(long, default_value = "1")]
        start_month: u32,
        /// Last month included (1-12)
        #[arg(long, default_value = "12")]
        end_month: u32,
        /// Print only the summary, without the matching records
        #[arg(long)]
        summary_only: bool,
    },
    /// Count every value of every field
    Frequency {
        /// District name
        #[arg(long)]
        district: Option<String>,
        /// Unit name
        #[arg(long)]
        unit: Option<String>,
    },
    /// Field summaries, narrative and hotspots for a beat
    BeatAnalysis {
        /// District name
        district: String,
        /// Unit name
        unit: String,
        /// Beat name
        beat: String,
        /// Print only the narrative text
        #[arg(long)]
        text: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs the server on actix's own runtime in a blocking task so it does
/// not nest inside the tokio runtime.
async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(crime_heatmap_server::run_server(config))
    })
    .await??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env();
    if let Some(dataset) = cli.dataset {
        config.dataset_path = dataset;
    }
    if cli.definition.is_some() {
        config.definition_path = cli.definition;
    }

    let Some(command) = cli.command else {
        tokio::task::spawn_blocking(move || {
            actix_web::rt::System::new().block_on(crime_heatmap_server::interactive::run(config))
        })
        .await??;
        return Ok(());
    };

    match command {
        Commands::Serve { bind_addr, port } => {
            if let Some(bind_addr) = bind_addr {
                config.bind_addr = bind_addr;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Commands::Query(query) => {
            let source = config.open_source().await?;
            log::debug!("Querying {}", source.describe());
            run_query(query, &source).await
        }
    }
}

async fn run_query(
    query: QueryCommand,
    source: &dyn RecordSource,
) -> Result<(), Box<dyn std::error::Error>> {
    match query {
        QueryCommand::Districts => print_json(&tools::list_districts(source).await?),
        QueryCommand::Units { district } => print_json(&tools::list_units(source, &district).await?),
        QueryCommand::Beats { unit } => print_json(&tools::list_beats(source, &unit).await?),
        QueryCommand::Beat { beat } => print_json(&tools::records_by_beat(source, &beat).await?),
        QueryCommand::Trend {
            district,
            unit,
            granularity,
        } => {
            let params = DistrictUnitParams { district, unit };
            match granularity {
                TimeGranularity::Hourly => print_json(&tools::crime_by_hour(source, &params).await?),
                TimeGranularity::Monthly => {
                    print_json(&tools::crime_by_month(source, &params).await?)
                }
                TimeGranularity::Weekly => print_json(&tools::crime_by_week(source, &params).await?),
            }
        }
        QueryCommand::Details {
            district,
            unit,
            start_month,
            end_month,
            summary_only,
        } => {
            let params = DetailsParams {
                district,
                unit,
                start_month,
                end_month,
            };
            let result = tools::details(source, &params).await?;
            if summary_only {
                print_json(&result.details)
            } else {
                print_json(&result)
            }
        }
        QueryCommand::Frequency { district, unit } => {
            let params = DataFrequencyParams {
                selected_district: district,
                selected_unit: unit,
            };
            print_json(&tools::data_frequency(source, &params).await?)
        }
        QueryCommand::BeatAnalysis {
            district,
            unit,
            beat,
            text,
        } => {
            let params = BeatAnalysisParams {
                district,
                unit,
                beat,
            };
            let analysis = tools::beat_analysis(source, &params).await?;
            if text {
                println!("{}", analysis.analysis_text);
                Ok(())
            } else {
                print_json(&analysis)
            }
        }
    }
}
