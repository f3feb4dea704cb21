//! Homeward CLI
//!
//! Ad-hoc queries against the Tractive API: locate the pet, list trackers,
//! inspect details, history, and hardware state. Output is pretty-printed
//! JSON.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use homeward_egress::{TractiveConfig, TractiveConnector};
use homeward_evaluator::{evaluate, EvalConfig};

#[derive(Parser)]
#[command(name = "homeward")]
#[command(about = "Pet tracker queries against the Tractive API", long_about = None)]
struct Cli {
    /// Tractive account email
    #[arg(long, env = "TRACTIVE_EMAIL", global = true)]
    email: Option<String>,

    /// Tractive account password
    #[arg(long, env = "TRACTIVE_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    /// Tractive API base URL override
    #[arg(long, env = "TRACTIVE_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report distance from home and the home/away classification
    Locate,
    /// List the trackers on the account
    Trackers,
    /// Show static details for one tracker
    Tracker {
        tracker_id: String,
    },
    /// Show position history for a time window
    History {
        tracker_id: String,

        /// Window start (RFC 3339, e.g. 2021-05-03T00:00:00Z)
        #[arg(long)]
        from: String,

        /// Window end (RFC 3339)
        #[arg(long)]
        to: String,
    },
    /// Show the latest hardware report (battery, firmware)
    Hardware {
        tracker_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TractiveConfig::new();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    let connector = TractiveConnector::new(config)?;

    match &cli.command {
        Commands::Locate => {
            let eval_config = EvalConfig::from_env()?;
            let report = evaluate(&connector, &eval_config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Trackers => {
            sign_in(&cli, &connector).await?;
            let trackers = connector.list_trackers().await?;
            println!("{}", serde_json::to_string_pretty(&trackers)?);
        }
        Commands::Tracker { tracker_id } => {
            sign_in(&cli, &connector).await?;
            let details = connector.get_tracker(tracker_id).await?;
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        Commands::History {
            tracker_id,
            from,
            to,
        } => {
            sign_in(&cli, &connector).await?;
            let history = connector
                .get_tracker_history(tracker_id, from.as_str(), to.as_str())
                .await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Commands::Hardware { tracker_id } => {
            sign_in(&cli, &connector).await?;
            let report = connector.get_tracker_hardware(tracker_id).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn sign_in(cli: &Cli, connector: &TractiveConnector) -> Result<()> {
    let email = cli
        .email
        .as_deref()
        .ok_or_else(|| anyhow!("TRACTIVE_EMAIL is not set (or pass --email)"))?;
    let password = cli
        .password
        .as_deref()
        .ok_or_else(|| anyhow!("TRACTIVE_PASSWORD is not set (or pass --password)"))?;

    connector.authenticate(email, password).await?;
    Ok(())
}
