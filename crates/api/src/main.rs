use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use api::config::AppConfig;
use api::server::AppState;

/// Serve the graph-augmented retrieval pipeline over HTTP.
#[derive(Parser)]
#[command(name = "server", version, about)]
struct Args {
    /// YAML config file; defaults apply for anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.log_json {
        tracing_subscriber::fmt().json().init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let config = AppConfig::load(args.config.as_deref())?;
    let pipeline = api::build_pipeline(&config);
    info!(
        addr = %config.server.bind_addr(),
        extractor = ?config.extractor,
        cache = config.cache.enabled,
        "starting server"
    );

    api::server::serve(AppState::new(pipeline, config)).await
}
