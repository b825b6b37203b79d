//! clinai-web - Readmission risk decision support service
//!
//! Serves the patient form, scores submissions with the trained model and
//! returns the risk gauge, recommendations and downloadable report.
//!
//! Startup is all-or-nothing: if the model or schema cannot be loaded the
//! process exits before binding the listener.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clinai_common::config::{CliOverrides, Settings};
use clinai_common::AppContext;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinai_web::{build_router, AppState};

/// Command-line arguments for clinai-web
#[derive(Parser, Debug)]
#[command(name = "clinai-web")]
#[command(about = "30-day readmission risk decision support service")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// XGBoost JSON model file
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Feature schema file (JSON array of column names)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            model_path: self.model.clone(),
            schema_path: self.schema.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::resolve(&args.overrides()).context("Failed to resolve configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("clinai_web={0},clinai_common={0},tower_http={0}", settings.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Clinical AI (clinai-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &settings.config_file {
        info!("Config file: {}", path.display());
    }
    info!("Model path: {}", settings.model_path.display());
    info!("Schema path: {}", settings.schema_path.display());

    // Missing or incompatible artifacts abort startup
    let context = AppContext::load(&settings.model_path, &settings.schema_path)
        .context("Failed to load scoring model")?;
    info!("✓ Scoring model ready: {}", context.oracle().describe());

    let app = build_router(AppState::new(context));

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("clinai-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
