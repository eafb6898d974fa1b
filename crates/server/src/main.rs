//! stash server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use stash_core::KeySource;
use stash_core::config::AppConfig;
use stash_metadata::UserRepo;
use stash_server::{AppState, Links, ShareXConfig, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// stash - a self-hosted file upload service
#[derive(Parser, Debug)]
#[command(name = "stashd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "STASH_CONFIG", default_value = "config/server.toml")]
    config: String,

    /// Register a user, print a ShareX uploader for them and exit
    #[arg(long, value_name = "NAME")]
    register: Option<String>,

    /// Override the listen host of server.bind
    #[arg(long, value_name = "HOST")]
    addr: Option<String>,

    /// Override the listen port of server.bind
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so --register output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&args.config)?;

    if let Some(name) = &args.register {
        return register(&config, name).await;
    }

    let addr = config
        .server
        .bind_addr(args.addr.as_deref(), args.port)
        .map_err(anyhow::Error::msg)?;

    tracing::info!("stash v{}", env!("CARGO_PKG_VERSION"));

    let blobs = stash_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    blobs
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = blobs.backend_name(), "Storage backend initialized");

    let metadata = stash_metadata::from_config(&config.metadata, KeySource::random())
        .await
        .context("failed to initialize metadata store")?;
    metadata
        .health_check()
        .await
        .context("metadata health check failed")?;
    tracing::info!("Metadata store initialized");

    let state = AppState::new(config, metadata, blobs);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Load configuration from the TOML file (if present) and `STASH_` env vars.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();

    if std::path::Path::new(path).exists() {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("No config file found at {}", path);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("STASH_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    Ok(config)
}

/// Create a user and print their ShareX uploader definition.
async fn register(config: &AppConfig, name: &str) -> Result<()> {
    let metadata = stash_metadata::from_config(&config.metadata, KeySource::random())
        .await
        .context("failed to initialize metadata store")?;

    let user = metadata
        .user_register(name)
        .await
        .with_context(|| format!("failed to register user {name}"))?;
    tracing::info!(user = %user.name, "User registered");

    let sharex = ShareXConfig::for_user(&Links::new(&config.server.base_url), &user);
    println!("{}", sharex.to_json().context("failed to render ShareX config")?);
    Ok(())
}
