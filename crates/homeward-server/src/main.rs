//! Homeward Server
//!
//! Serves one question over HTTP: is the pet home?
//! - `GET /location` authenticates against the Tractive API, fetches the
//!   configured tracker's position, and reports distance-from-home
//! - `GET /healthz` liveness probe
//!
//! Usage:
//! ```bash
//! # With environment variables only
//! TRACTIVE_EMAIL=you@example.com TRACTIVE_PASSWORD=secret \
//! TRACKER_ID=ZLHQOVQA HOME_LATITUDE=53.839425 HOME_LONGITUDE=11.993049 \
//! homeward-server
//!
//! # With a config file (env vars override file values)
//! homeward-server --config config.yaml
//! ```
//!
//! Test with:
//! ```bash
//! curl http://localhost:8080/location
//! ```

mod app;
mod config;

use app::AppState;
use clap::Parser;
use config::ServerConfig;
use homeward_egress::TractiveConfig;
use homeward_evaluator::EvalConfig;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const CAT: &str = r#"
  /\_/\      _                                                _
 ( o.o )    | |__   ___  _ __ ___   _____      ____ _ _ __ __| |
  > ^ <     | '_ \ / _ \| '_ ` _ \ / _ \ \ /\ / / _` | '__/ _` |
 /|   |\    | | | | (_) | | | | | |  __/\ V  V / (_| | | | (_| |
(_|   |_)   |_| |_|\___/|_| |_| |_|\___| \_/\_/ \__,_|_|  \__,_|
"#;

/// Homeward Server - pet tracker home-presence reporting
#[derive(Parser)]
#[command(name = "homeward-server")]
#[command(about = "Reports whether the tracked pet is within the home radius", long_about = None)]
struct Cli {
    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, value_name = "FILE", env = "HOMEWARD_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = cli.config {
        ServerConfig::from_file(&config_path)?
    } else {
        ServerConfig::default()
    };

    // Merge environment variables (they override config file)
    config.merge_env();

    // Initialize tracing with the configured level
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!("{}", log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("{}", CAT);

    info!("Starting Homeward server");

    // Evaluation settings come straight from the environment
    let eval_config = EvalConfig::from_env()?;
    info!(tracker_id = %eval_config.tracker_id, "Tracker configured");

    let mut tractive_config = TractiveConfig::new();
    if let Some(base_url) = &config.tractive.base_url {
        info!("Using Tractive base URL override: {}", base_url);
        tractive_config = tractive_config.with_base_url(base_url);
    }

    let state = AppState::new(eval_config, tractive_config);
    let app = app::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
