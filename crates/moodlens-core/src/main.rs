use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use moodlens_core::camera::{FacingMode, NoCamera, VideoConstraints};
use moodlens_core::client::AnalysisClient;
use moodlens_core::session::{Analyzer, MoodSession, Outcome, Resilience};
use moodlens_core::{render, AppState, Config, Orchestrator};
use moodlens_gateway::GatewayClient;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "moodlens", version, about = "Photo mood analysis with AI suggestions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the orchestrator HTTP endpoint
    Serve {
        /// Port to listen on (overrides HTTP_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Analyze one photo and print the suggestion
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Image file to upload
    #[arg(long, conflicts_with = "camera", required_unless_present = "camera")]
    file: Option<PathBuf>,

    /// Capture from the default camera instead of a file
    #[arg(long)]
    camera: bool,

    /// Which camera to open with --camera
    #[arg(long, value_enum, default_value_t = FacingMode::User)]
    facing: FacingMode,

    /// Orchestrator endpoint (overrides ORCHESTRATOR_URL)
    #[arg(long)]
    endpoint: Option<String>,

    /// Run the orchestrator in-process instead of calling an endpoint
    #[arg(long, conflicts_with = "endpoint")]
    local: bool,

    /// Use the offline fallback suggestion when the analysis fails
    #[arg(long)]
    offline_fallback: bool,
}

fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let gateway =
        GatewayClient::new(config.gateway_config()).context("Failed to build AI gateway client")?;
    Ok(Orchestrator::new(gateway))
}

async fn run_analysis<A: Analyzer>(session: &MoodSession<A>, args: &AnalyzeArgs) -> Result<Outcome> {
    let outcome = match &args.file {
        Some(path) => session.submit_file(path).await?,
        None => {
            let constraints = VideoConstraints {
                facing_mode: args.facing,
                ..VideoConstraints::default()
            };
            session.submit_camera(&NoCamera, &constraints).await?
        }
    };
    Ok(outcome)
}

async fn analyze(config: &Config, args: AnalyzeArgs) -> Result<()> {
    let resilience = if args.offline_fallback {
        Resilience::OfflineFallback
    } else {
        config.resilience
    };

    let outcome = if args.local {
        let session = MoodSession::new(build_orchestrator(config)?, resilience);
        run_analysis(&session, &args).await?
    } else {
        let endpoint = args
            .endpoint
            .clone()
            .unwrap_or_else(|| config.orchestrator_url.clone());
        let client = AnalysisClient::with_timeout(
            endpoint,
            config.orchestrator_anon_key.clone(),
            config.client_timeout(),
        )?;
        info!("Using orchestrator at {}", client.endpoint());
        let session = MoodSession::new(client, resilience);
        run_analysis(&session, &args).await?
    };

    if outcome.fallback {
        warn!("Showing offline suggestion");
    }
    println!("{}", render::render(&outcome.result).to_terminal());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "moodlens_core=debug,moodlens_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    match cli.command {
        Command::Serve { port } => {
            info!("MoodLens orchestrator starting up...");
            info!("  AI gateway: {}", config.ai_gateway_url);
            info!("  Model: {}", config.ai_gateway_model);
            if config.ai_gateway_api_key.is_none() {
                warn!("AI_GATEWAY_API_KEY not set - every analysis request will fail");
            }

            let state = AppState::new(build_orchestrator(&config)?)
                .with_max_body_bytes(config.http_max_body_bytes);
            moodlens_core::server::serve(state, port.unwrap_or(config.http_port)).await?;
        }
        Command::Analyze(args) => analyze(&config, args).await?,
    }

    Ok(())
}
