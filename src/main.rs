use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warden::api::routes;
use warden::cli::{
    init::{self, InitConfig, InitResult},
    output::Output,
    Cli, Commands,
};
use warden::{AppState, SessionRotator, WardenConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before the config resolves its env var references
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config, cli.verbose).await,
        Commands::Init {
            path,
            force,
            host,
            port,
        } => match init::run(
            InitConfig {
                path,
                force,
                host,
                port,
            },
            &output,
        ) {
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
            InitResult::Error(e) => anyhow::bail!("init failed: {}", e),
        },
        Commands::Purge => purge(&cli.config, cli.verbose, &output).await,
    }
}

fn load_config(path: &Path) -> anyhow::Result<WardenConfig> {
    WardenConfig::load(path).with_context(|| format!("failed to load {}", path.display()))
}

fn init_tracing(config: &WardenConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.server.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_state(config: Arc<WardenConfig>) -> anyhow::Result<AppState> {
    let provider = config.database_provider()?;
    let db = provider
        .create_client()
        .await
        .context("failed to open database")?;

    Ok(AppState::new(config, db.clone(), db)?)
}

async fn serve(config_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let config = Arc::new(load_config(config_path)?);
    init_tracing(&config, verbose);

    info!(config = %config_path.display(), "Starting Warden");

    let state = build_state(config.clone()).await?;
    spawn_purge_task(state.sessions.clone(), config.cleanup.purge_interval_secs);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, "Warden listening");

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn purge(config_path: &Path, verbose: bool, output: &Output) -> anyhow::Result<()> {
    let config = Arc::new(load_config(config_path)?);
    init_tracing(&config, verbose);

    let state = build_state(config).await?;
    let purged = state.sessions.purge_stale().await?;

    output.success(&format!("Purged {} expired or revoked refresh tokens", purged));
    Ok(())
}

/// Periodically deletes expired and revoked refresh tokens.
fn spawn_purge_task(sessions: Arc<SessionRotator>, interval_secs: u64) {
    if interval_secs == 0 {
        info!("Refresh token purge disabled");
        return;
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            if let Err(e) = sessions.purge_stale().await {
                error!(error = %e, "Refresh token purge failed");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
