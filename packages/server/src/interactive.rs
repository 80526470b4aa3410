//! Interactive mode for the server.
//!
//! Prompts the user for the listen address and dataset before starting
//! the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Each prompt defaults to the matching value in `defaults`; the answers
/// are passed to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run(defaults: ServerConfig) -> std::io::Result<()> {
    println!("Crime Heatmap Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or(defaults.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let dataset: String = Input::new()
        .with_prompt("Dataset CSV")
        .default(defaults.dataset_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| defaults.dataset_path.display().to_string());

    let config = ServerConfig {
        bind_addr,
        port,
        dataset_path: PathBuf::from(dataset),
        definition_path: defaults.definition_path,
    };

    if !Confirm::new()
        .with_prompt(format!(
            "Serve {} on {}:{}?",
            config.dataset_path.display(),
            config.bind_addr,
            config.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
