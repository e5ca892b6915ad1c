use anyhow::{anyhow, Result};
use clap::Parser;
use phonebot::load_config;
use phonebot_api::AppState;
use phonebot_llm::{OpenAiClient, OpenAiReasoner, OpenAiSlotExtractor, SpeechSynthesizer};
use phonebot_metrics::{MetricsService, TracingService};
use phonebot_notify::{LogNotifier, MailgunNotifier, Notifier};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "phonebot-server")]
#[command(about = "Multi-tenant tools API for the event-rental phone agent")]
struct Args {
    /// Settings file; defaults to configs/default.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(err) => warn!("Unable to listen for shutdown signal: {}", err),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    TracingService::init().map_err(|e| anyhow!("failed to initialise tracing: {}", e))?;

    info!("Starting Phonebot server");

    let config = load_config(args.config.as_deref())?;
    info!(
        bind = %config.server.bind,
        port = config.server.port,
        tenants_dir = %config.tenants.dir,
        "Configuration loaded"
    );

    let llm = OpenAiClient::new(config.llm.clone())?;
    let reasoner = Arc::new(OpenAiReasoner::new(llm.clone()));
    let slot_extractor = Arc::new(OpenAiSlotExtractor::new(llm.clone()));
    let speech = if config.llm.api_key.is_empty() {
        warn!("No LLM API key configured; /speech is disabled");
        None
    } else {
        Some(Arc::new(SpeechSynthesizer::new(llm, config.tts.clone())))
    };

    let notifier: Arc<dyn Notifier> = if config.mailgun.domain.is_empty() {
        warn!("No Mailgun domain configured; lead e-mails are logged only");
        Arc::new(LogNotifier)
    } else {
        Arc::new(MailgunNotifier::new(config.mailgun.clone())?)
    };

    let metrics = Arc::new(MetricsService::new()?);
    let state = AppState::new(config, reasoner, slot_extractor, notifier, speech, metrics);

    phonebot_api::start_server(state, shutdown_signal())
        .await
        .map_err(|e| anyhow!("server error: {}", e))?;

    info!("Phonebot server shutdown complete");
    Ok(())
}
