use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use agriprofit::api::{AppState, EstimateResponse};
use agriprofit::{AgriProfitConfig, app, report, telemetry, web};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// AgriProfit - crop recommendation and profit estimation by pincode
#[derive(Parser)]
#[command(name = "agriprofit")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "AGRIPROFIT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Estimate crops and profit for one plot
    Estimate {
        /// Six-digit postal pincode
        #[arg(long)]
        pincode: String,

        /// Land area in hectares
        #[arg(long)]
        area: f64,

        /// Print the recommendation as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AgriProfitConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    telemetry::init(&config.logging, cli.verbose)?;

    let pipeline = Arc::new(app::build_pipeline(&config)?);

    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let timeout = Duration::from_secs(config.server.request_timeout_seconds.into());
            web::run(port, timeout, AppState::new(pipeline)).await?;
        }
        Command::Estimate {
            pincode,
            area,
            json,
        } => match pipeline.estimate(&pincode, area).await {
            Ok(rec) => {
                if json {
                    let response = EstimateResponse::from(rec);
                    println!("{}", serde_json::to_string_pretty(&response)?);
                } else {
                    print!(
                        "{}",
                        report::render(&rec, config.estimation.loan_to_cost_ratio)
                    );
                }
            }
            Err(e) => {
                tracing::debug!("Estimation failed: {}", e);
                eprintln!("Error: {}", e.user_message());
                process::exit(1);
            }
        },
    }

    Ok(())
}
