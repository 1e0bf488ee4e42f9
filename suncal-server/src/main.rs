mod html;
mod routes;
mod state;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use suncal_core::SuncalConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::ServerState;

#[derive(Parser)]
#[command(name = "suncal")]
#[command(about = "Sunday-first calendar with events kept in a local JSON file")]
struct Cli {
    /// Config file (defaults to ~/.config/suncal/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file to keep events in
    #[arg(short, long)]
    events_file: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = resolve_config(cli)?;
    let Some(config) = config else {
        return Ok(());
    };

    let addr = (config.host.clone(), config.port);
    let state = ServerState::new(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind((addr.0.as_str(), addr.1))
        .await
        .with_context(|| format!("Failed to bind {}:{}", addr.0, addr.1))?;
    tracing::info!("suncal listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Merge config file, environment and flags. Returns `None` when the command
/// only printed the configuration.
fn resolve_config(cli: Cli) -> Result<Option<SuncalConfig>> {
    let mut config = SuncalConfig::load(cli.config.as_deref())?;

    if let Some(events_file) = cli.events_file {
        config.events_file = events_file;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(None);
    }

    Ok(Some(config))
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
