//! Table Facets server
//!
//! HTTP server and command line tools for faceted search.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tablefacets_kernel::config::Config;
use tablefacets_kernel::explain::explain;
use tablefacets_kernel::facets::FacetConfig;
use tablefacets_kernel::routes;
use tablefacets_kernel::state::AppState;

/// Headroom between the search deadline and the request timeout.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "tablefacets")]
#[command(about = "Faceted search over a single database table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Print the SQL a search would run, without touching the database
    Explain {
        /// Facet configuration file (.toml, .yml, .yaml or .json)
        #[arg(long)]
        config: PathBuf,

        /// Query string, e.g. "state[]=CA&keys=water"
        #[arg(default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    match Cli::parse().command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Explain { config, query } => {
            let config = FacetConfig::load(&config)
                .with_context(|| format!("failed to load {}", config.display()))?;
            print!("{}", explain(&config, query.trim_start_matches('?')));
            Ok(())
        }
    }
}

async fn serve() -> Result<()> {
    info!("Starting tablefacets server");

    // Load configuration from environment
    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let app = routes::app(state, config.request_deadline + REQUEST_TIMEOUT_SLACK);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;
    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
