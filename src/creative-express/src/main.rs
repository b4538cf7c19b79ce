//! Creative Express — generates a safety-gated slate of five ad creative
//! variants for one audience, product and brand.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use creative_core::config::AppConfig;
use creative_core::types::PlatformFormat;
use creative_core::GenerationRequest;
use creative_dco::{
    ContentSafetyGate, SimulatedImageBackend, SimulatedVisionValidator, VariantBundle,
    VariantOrchestrator,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "creative-express")]
#[command(about = "Safety-gated creative variant generation")]
#[command(version)]
struct Cli {
    /// Generation request document (JSON). Uses the built-in sample when omitted.
    #[arg(long)]
    request: Option<PathBuf>,

    /// Campaign name (overrides request and config)
    #[arg(long, env = "CREATIVE_EXPRESS__CAMPAIGN_NAME")]
    campaign: Option<String>,

    /// Delivery platform tag, e.g. `square_feed` (overrides request)
    #[arg(long)]
    platform: Option<String>,

    /// Output directory for the bundle (overrides config)
    #[arg(long, env = "CREATIVE_EXPRESS__OUTPUT__BUNDLE_DIR")]
    output: Option<PathBuf>,

    /// Run strategies one after another instead of concurrently
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Per-strategy backend timeout in milliseconds (overrides config)
    #[arg(long, env = "CREATIVE_EXPRESS__GENERATION__TASK_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creative_express=info,creative_dco=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if cli.sequential {
        config.generation.concurrent = false;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.generation.task_timeout_ms = timeout_ms;
    }
    if let Some(dir) = &cli.output {
        config.output.bundle_dir = dir.display().to_string();
    }

    let mut request = match &cli.request {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading request {}", path.display()))?;
            serde_json::from_str::<GenerationRequest>(&raw)
                .with_context(|| format!("parsing request {}", path.display()))?
        }
        None => {
            info!("No request supplied, using sample request");
            GenerationRequest::sample()
        }
    };

    if let Some(tag) = &cli.platform {
        request.platform = tag.parse::<PlatformFormat>()?;
    }

    let campaign = cli
        .campaign
        .clone()
        .or_else(|| request.campaign_name.clone())
        .unwrap_or_else(|| config.campaign_name.clone());

    info!(
        campaign = %campaign,
        platform = %request.platform,
        concurrent = config.generation.concurrent,
        task_timeout_ms = config.generation.task_timeout_ms,
        "Configuration loaded"
    );

    let registry = request.into_registry()?;
    let gate = ContentSafetyGate::new(registry.guidelines().clone());
    let orchestrator = VariantOrchestrator::new(
        SimulatedImageBackend::new(),
        SimulatedVisionValidator::new(),
        config.generation.clone(),
    );

    let report = orchestrator.generate_from_registry(&registry, &gate).await;
    for rejection in &report.rejections {
        warn!(
            strategy = %rejection.strategy,
            reason = rejection.reason.as_str(),
            score = ?rejection.safety_score,
            violations = ?rejection.violations,
            "Strategy missing from slate"
        );
    }

    let bundle = VariantBundle::from_report(campaign, &report);
    let bundle_path = bundle.save_json(&config.output.bundle_dir)?;
    if config.output.write_delivery_format {
        let delivery_path = bundle.save_delivery_json(&config.output.bundle_dir)?;
        info!(path = %delivery_path.display(), "Delivery format written");
    }

    info!(
        path = %bundle_path.display(),
        accepted = report.variants.len(),
        rejected = report.rejections.len(),
        latency_ms = report.latency_ms,
        "Creative Express run complete"
    );

    Ok(())
}
