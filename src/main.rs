use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use habit_hero::api;
use habit_hero::config::{ServerConfig, StorageConfig};

#[derive(Parser)]
#[command(name = "habit-hero")]
#[command(about = "Track habits, daily check-ins and notes over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    server: ServerConfig,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Habit Hero server
    Serve(ServerConfig),
    /// Create or update the database schema, then exit
    Migrate(StorageConfig),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "habit_hero=debug,habit_core=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(config)) => serve(config).await?,
        Some(Commands::Migrate(storage)) => {
            storage.open()?;
            println!("Database schema is up to date");
        }
        // Default: start server
        None => serve(cli.server).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    tracing::info!("Starting Habit Hero server on {}", addr);

    let db = config.storage.open()?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Habit Hero server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Habit Hero server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
