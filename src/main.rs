use anyhow::{Context, Result};
use clap::Parser;
use embed_relay::api::build_routes;
use embed_relay::core::models::{Credentials, RelayConfig};
use embed_relay::core::services::GoogleIdentityProvider;
use embed_relay::state::AppState;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "RELAY_PORT", default_value_t = 9000)]
    port: u16,

    #[arg(long, env = "RELAY_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// JSON file with `clientID` and `clientSecret` (default: ~/validateKeys.json)
    #[arg(short, long, env = "RELAY_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// The only account allowed through the relay
    #[arg(long, env = "RELAY_ALLOWED_EMAIL")]
    allowed_email: String,

    /// File served at /binary.html
    #[arg(long, env = "RELAY_ASSET", default_value = "./binary.html")]
    asset: PathBuf,

    #[arg(long, default_value = "postmessage")]
    redirect_uri: String,

    /// Outbound timeout in seconds; unset waits on the origin indefinitely
    #[arg(long, env = "RELAY_TIMEOUT_SECS")]
    relay_timeout_secs: Option<u64>,

    /// Write error details and cause chains into 500 responses
    #[arg(long, env = "RELAY_DEBUG_ERRORS")]
    debug_errors: bool,

    /// Also write daily rolling log files into this directory
    #[arg(long, env = "RELAY_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(fmt::layer());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "embed-relay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_dir.as_deref());

    let credentials_path = args
        .credentials
        .clone()
        .or_else(Credentials::default_path)
        .context("No credentials path given and no home directory found")?;
    let credentials = Credentials::load(&credentials_path).map_err(anyhow::Error::msg)?;
    tracing::info!("Loaded OAuth client credentials from {:?}", credentials_path);

    let provider = GoogleIdentityProvider::new(credentials, args.redirect_uri.clone())
        .map_err(anyhow::Error::msg)?;

    let mut config = RelayConfig::new(args.allowed_email.clone());
    config.asset_path = args.asset.clone();
    config.debug_errors = args.debug_errors;
    config.relay_timeout = args.relay_timeout_secs.map(Duration::from_secs);

    if config.debug_errors {
        tracing::warn!("Debug errors enabled: 500 responses will include internal error details");
    }

    let state = Arc::new(AppState::new(config, Arc::new(provider))?);
    let app = build_routes(state);

    let addr = SocketAddr::new(args.bind, args.port);
    tracing::info!(
        "Relay listening on {} (allowed: {})",
        addr,
        args.allowed_email
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
