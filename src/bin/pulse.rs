use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pulse_health_api::{Config, PulseClient};

#[derive(Parser)]
#[command(name = "pulse", about = "Daily progress and health insights", version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute today's progress score
    Progress,
    /// Show ranked insights for a day
    Insights {
        /// Day to analyze (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the raw health snapshot for a day
    Metrics {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let client = connect(config).await?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Progress => {
            let progress = client.daily_progress().await?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        Commands::Insights { date } => {
            let insights = client.insights(date.unwrap_or(today)).await?;
            println!("{}", serde_json::to_string_pretty(&insights)?);
        }
        Commands::Metrics { date } => {
            let metrics = client.health_metrics(date.unwrap_or(today)).await?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            if let Some(bmi) = metrics.bmi() {
                tracing::info!(bmi, "Body mass index");
            }
        }
    }

    Ok(())
}

/// Refresh token wins; otherwise sign in with email and password.
async fn connect(config: Config) -> Result<PulseClient> {
    if let Ok(token) = std::env::var("PULSE_REFRESH_TOKEN") {
        return Ok(PulseClient::new(config, token));
    }

    let email = std::env::var("PULSE_EMAIL")
        .context("PULSE_REFRESH_TOKEN or PULSE_EMAIL must be set")?;
    let password = std::env::var("PULSE_PASSWORD").context("PULSE_PASSWORD must be set")?;
    PulseClient::login(config, &email, &password)
        .await
        .context("signing in")
}
