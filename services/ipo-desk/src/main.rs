//! ipo-desk entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ipo_common::config::Config;
use ipo_common::logging::init_logging_with_exclusions;
use ipo_desk::{
    build_router, run_report, AppState, ChromeRenderer, DeskSettings, GeminiSummarizer, IpoCache,
    IpoDesk, IpoKind,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// IPO Desk - mainboard IPO listings with AI-written analyses.
#[derive(Parser, Debug)]
#[command(name = "ipo-desk")]
#[command(version)]
#[command(about = "Scrape mainboard IPOs and summarize them with Gemini.", long_about = None)]
struct Cli {
    /// Config file (default: ~/.ipodesk/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Analyze every listed IPO once and print the results
    Report {
        /// Which lists to analyze
        #[arg(long, value_enum, default_value_t = ReportKind::All)]
        kind: ReportKind,

        /// Seconds to pause between IPOs (default from config)
        #[arg(long)]
        pause_secs: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportKind {
    Current,
    Upcoming,
    All,
}

impl ReportKind {
    fn kinds(self) -> Vec<IpoKind> {
        match self {
            ReportKind::Current => vec![IpoKind::Current],
            ReportKind::Upcoming => vec![IpoKind::Upcoming],
            ReportKind::All => IpoKind::ALL.to_vec(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::load_and_validate(cli.config.as_deref())?;
    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("IPO Desk v{}", env!("CARGO_PKG_VERSION"));

    let desk = build_desk(&config);

    match cli.command.unwrap_or(Commands::Serve {
        bind: None,
        port: None,
    }) {
        Commands::Serve { bind, port } => {
            let bind = bind.unwrap_or_else(|| config.network.bind.clone());
            let port = port.unwrap_or(config.network.port);
            serve(desk, &bind, port, startup_start).await
        }
        Commands::Report { kind, pause_secs } => {
            let pause = Duration::from_secs(pause_secs.unwrap_or(config.report.pause_secs));
            let mut stdout = std::io::stdout();
            let summary = run_report(&desk, &kind.kinds(), pause, &mut stdout).await?;
            tracing::info!(
                analyzed = summary.analyzed,
                failed = summary.failed,
                "Batch report done"
            );
            Ok(())
        }
    }
}

/// Wire the Chrome renderer and Gemini summarizer into a desk.
fn build_desk(config: &Config) -> IpoDesk {
    let renderer = ChromeRenderer::from_config(&config.scraper);
    let summarizer = GeminiSummarizer::new(config.google_api_key(), &config.llm);
    if !summarizer.has_api_key() {
        tracing::warn!("No Gemini API key configured; analyses will fail");
    }
    tracing::info!(model = %summarizer.model(), "Summarizer ready");

    IpoDesk::new(
        Arc::new(renderer),
        Arc::new(summarizer),
        IpoCache::with_ttl_secs(config.cache.ttl_secs),
        DeskSettings::from_config(config),
    )
}

async fn serve(
    desk: IpoDesk,
    bind: &str,
    port: u16,
    startup_start: std::time::Instant,
) -> Result<()> {
    let state = AppState::new(desk);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {bind}:{port}"))?;

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
