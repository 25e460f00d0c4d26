use std::path::{Path, PathBuf};
use std::sync::Arc;

use dialoguecast_backend::controllers::jobs::JobsController;
use dialoguecast_backend::domain::dialogue::{CleaningRules, Normalizer};
use dialoguecast_backend::domain::job::{JobService, SynthesisDispatcher};
use dialoguecast_backend::infrastructure::config::{Config, LogFormat};
use dialoguecast_backend::infrastructure::http::start_http_server;
use dialoguecast_backend::infrastructure::repositories::{ElevenLabsRepository, JobStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting DialogueCast Backend on {}:{}",
        config.host,
        config.port
    );

    // Compile cleaning rules (external file or built-in defaults)
    let rules = match &config.cleaning_rules_path {
        Some(path) => {
            tracing::info!(path = %path, "loading cleaning rules");
            CleaningRules::from_file(Path::new(path))?
        }
        None => {
            tracing::info!("using built-in cleaning rules");
            CleaningRules::default()
        }
    };
    let normalizer = Arc::new(Normalizer::new(rules)?);

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate the job store and synthesis repository
    tracing::info!("Instantiating repositories...");
    let job_store = Arc::new(JobStore::new());
    let synthesis_repo = Arc::new(ElevenLabsRepository::new(
        config.synthesis_base_url.clone(),
        config.synthesis_model_id.clone(),
        config.output_format.clone(),
    ));

    // 2. Instantiate the dispatcher and service
    tracing::info!("Instantiating services...");
    let dispatcher = Arc::new(SynthesisDispatcher::new(
        job_store.clone(),
        synthesis_repo,
        config.max_concurrent_syntheses,
        config.output_format.clone(),
    ));
    let job_service = Arc::new(JobService::new(
        job_store.clone(),
        dispatcher,
        normalizer,
        config.script.clone(),
        config.fan_out_role.clone(),
        config.shared_folder.clone(),
        PathBuf::from(&config.output_dir),
    ));

    // 3. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let jobs_controller = Arc::new(JobsController::new(job_service));

    // Start HTTP server with all routes
    start_http_server(config, jobs_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "dialoguecast_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "dialoguecast_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
