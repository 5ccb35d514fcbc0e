//! WakaTime Sensors CLI
//!
//! Command-line interface for one-off operations:
//! - Fetch once and print the sensors
//! - Check an API key
//! - Query a running daemon
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use wakatime_sensors::client::{ClientError, WakatimeClient};
use wakatime_sensors::config::{self, Config};
use wakatime_sensors::coordinator::RefreshCoordinator;
use wakatime_sensors::sensors::{self, SensorState};

#[derive(Parser)]
#[command(name = "wakatime-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Coding-activity sensors from the WakaTime API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Daemon URL for `status`
    #[arg(long, default_value = "http://localhost:8095", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch once and print every sensor
    Sensors,

    /// Check that the API key is accepted
    Check,

    /// Print the raw category list for the current user
    Categories,

    /// Show the refresh status of a running daemon
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sensors => {
            let config = load_config(cli.config.as_deref())?;
            let coordinator = RefreshCoordinator::new(
                Arc::new(build_client(&config)),
                config.coordinator.refresh_config(),
            );

            let snapshot = coordinator
                .first_refresh()
                .await
                .context("Failed to fetch WakaTime data")?;
            let states = sensors::evaluate_all(Some(&*snapshot));

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&states)?),
                _ => print_table(&states),
            }

            coordinator.shutdown().await;
        }

        Commands::Check => {
            let config = load_config(cli.config.as_deref())?;
            let client = build_client(&config);

            match client.validate_credentials().await {
                Ok(account) => {
                    println!("API key OK");
                    println!("  Endpoint: {}", client.base_url());
                    println!("  Account:  {}", account.email);
                    if let Some(name) = account.display_name {
                        println!("  Name:     {}", name);
                    }
                }
                Err(ClientError::InvalidAuth) => {
                    eprintln!("API key rejected by {}", client.base_url());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot reach {}", client.base_url());
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Categories => {
            let config = load_config(cli.config.as_deref())?;
            let categories = build_client(&config).categories().await?;

            println!("{}", serde_json::to_string_pretty(&categories)?);
        }

        Commands::Status => {
            let response = reqwest::Client::new()
                .get(format!("{}/api/v1/refresh/status", cli.api_url))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let status: serde_json::Value = resp.json().await?;

                    if cli.format == "json" {
                        println!("{}", serde_json::to_string_pretty(&status)?);
                        return Ok(());
                    }

                    println!("WakaTime sensors v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("Phase:         {}", field(&status, "phase"));
                    println!("Last outcome:  {}", field(&status, "last_outcome"));
                    println!("Last attempt:  {}", field(&status, "last_attempt"));
                    println!("Last success:  {}", field(&status, "last_success"));
                    println!("Cycles:        {}", field(&status, "cycles"));

                    let failures = status["consecutive_failures"].as_u64().unwrap_or(0);
                    if failures > 0 {
                        println!();
                        println!("Consecutive failures: {}", failures);
                        println!("Last error: {}", field(&status, "last_error"));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to the daemon at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure it is running:");
                    eprintln!("  wakatime-sensors");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    config.validate()?;

    Ok(config)
}

fn build_client(config: &Config) -> WakatimeClient {
    WakatimeClient::new(
        &config.wakatime.api_key,
        reqwest::Client::new(),
        &config.wakatime.base_url,
    )
}

/// Render a status field, showing "-" for null
fn field(value: &serde_json::Value, name: &str) -> String {
    match &value[name] {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn print_table(states: &[SensorState]) {
    println!("{:<20} {:<28} {}", "Sensor", "Value", "Unit");
    println!("{}", "-".repeat(56));

    for state in states {
        let value = state
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<20} {:<28} {}",
            state.description.key.as_str(),
            value,
            state.description.unit.unwrap_or("")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_formats_nulls_and_strings() {
        let status = json!({"phase": "idle", "cycles": 3, "last_error": null});

        assert_eq!(field(&status, "phase"), "idle");
        assert_eq!(field(&status, "cycles"), "3");
        assert_eq!(field(&status, "last_error"), "-");
        assert_eq!(field(&status, "missing"), "-");
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["wakatime-cli", "sensors", "--format", "json"]).unwrap();

        assert!(matches!(cli.command, Commands::Sensors));
        assert_eq!(cli.format, "json");
        assert_eq!(cli.api_url, "http://localhost:8095");
    }
}
