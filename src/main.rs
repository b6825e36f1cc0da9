use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yubin_backend::api;
use yubin_backend::config;
use yubin_backend::setup::{self, SetupOptions, SourceLocation};
use yubin_backend::state::AppState;

#[derive(Parser)]
#[command(name = "yubin-backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Japanese postal code lookup server / 郵便番号検索サーバー")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the lookup API (default)
    Serve,

    /// Download KEN_ALL, normalize it and write the postal artifact
    Setup {
        /// Local KEN_ALL .zip or .csv instead of downloading
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Archive URL (defaults to config source.url)
        #[arg(short, long, value_name = "URL", conflicts_with = "input")]
        url: Option<String>,

        /// Artifact output path (defaults to config data path)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yubin_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration / 設定を読み込み
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(app_config).await,
        Commands::Setup { input, url, output } => {
            let source = match input {
                Some(path) => SourceLocation::File(path),
                None => SourceLocation::Url(url.unwrap_or_else(|| app_config.source.url.clone())),
            };
            let options = SetupOptions {
                source,
                encoding: app_config.source.encoding.clone(),
                output: output.unwrap_or_else(|| app_config.get_artifact_path()),
            };
            let result = setup::run_setup(&options).await?;
            tracing::info!(
                "{} records written ({} short rows, {} duplicates skipped)",
                result.count,
                result.skipped,
                result.duplicates
            );
            Ok(())
        }
    }
}

async fn serve(app_config: config::AppConfig) -> anyhow::Result<()> {
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    let artifact_path = app_config.get_artifact_path();
    let state = Arc::new(tokio::task::spawn_blocking(move || AppState::load(artifact_path)).await?);

    let app = api::router(state, &app_config.get_public_dir());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
