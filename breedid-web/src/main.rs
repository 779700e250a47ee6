//! breedid-web - dog breed classification web service
//!
//! Loads the classifier model once, then serves the upload page and JSON
//! API until Ctrl+C / SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use breedid_classifier::{
    BreedClassifier, BreedKnowledgeBase, DecisionPolicy, ImageNormalizer, LabelSet,
    OnnxBreedPredictor,
};
use breedid_common::config::{default_config_path, ConfigOverrides, TomlConfig};
use breedid_web::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often idle sessions are swept
const SESSION_SWEEP_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

/// Command-line arguments for breedid-web
#[derive(Parser, Debug)]
#[command(name = "breedid-web")]
#[command(about = "Dog breed classification web service")]
#[command(version)]
struct Args {
    /// Path to a TOML config file (default: $BREEDID_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "BREEDID_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "BREEDID_PORT")]
    port: Option<u16>,

    /// ONNX model file
    #[arg(short, long, env = "BREEDID_MODEL")]
    model: Option<PathBuf>,

    /// Directory for accepted images
    #[arg(long, env = "BREEDID_GALLERY_DIR")]
    gallery_dir: Option<PathBuf>,

    /// Acceptance threshold in [0, 1]
    #[arg(long, env = "BREEDID_THRESHOLD")]
    threshold: Option<f32>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, env = "BREEDID_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            model_path: self.model.clone(),
            gallery_dir: self.gallery_dir.clone(),
            confidence_threshold: self.threshold,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before the subscriber exists so its level can apply
    let loaded = TomlConfig::load(args.config.as_deref()).map(|mut config| {
        config.apply_overrides(args.overrides());
        config
    });

    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => args.log_level.clone().unwrap_or_else(|| "info".to_string()),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting breedid-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = loaded.context("Failed to load configuration")?;
    match args.config.clone().or_else(default_config_path) {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        _ => warn!("No config file found, using compiled defaults"),
    }
    config.validate().context("Invalid configuration")?;

    let classifier = build_classifier(&config)?;
    info!(
        "Classifier ready: {} ({} labels, threshold {:.2})",
        classifier.predictor_description(),
        classifier.labels().len(),
        classifier.policy().threshold()
    );
    info!("Gallery directory: {}", config.gallery.dir.display());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, Arc::new(classifier));
    let sweeper = state.sessions.spawn_sweeper(SESSION_SWEEP_PERIOD);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("breedid-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Load the model and assemble the pipeline; any failure is fatal
fn build_classifier(config: &TomlConfig) -> Result<BreedClassifier> {
    let labels = LabelSet::new(config.model.labels.iter().cloned())
        .context("Invalid label set")?;
    let normalizer = ImageNormalizer::new(config.model.input_width, config.model.input_height);
    let policy = DecisionPolicy::new(config.model.confidence_threshold)
        .context("Invalid confidence threshold")?;

    let predictor = match OnnxBreedPredictor::load(
        &config.model.path,
        config.model.input_width,
        config.model.input_height,
    ) {
        Ok(predictor) => {
            info!("✓ Loaded model {}", config.model.path.display());
            predictor
        }
        Err(e) => {
            error!("Failed to load model {}: {}", config.model.path.display(), e);
            return Err(e.into());
        }
    };

    let knowledge = BreedKnowledgeBase::builtin();
    for label in labels.iter().filter(|label| !knowledge.contains(label)) {
        warn!("No breed information for label '{}'", label);
    }

    Ok(BreedClassifier::new(
        labels,
        normalizer,
        Arc::new(predictor),
        policy,
        knowledge,
    ))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
