use clap::{Parser, Subcommand};
use parish_hub::config::Config;
use parish_hub::server::AppState;
use parish_hub::storage::Storage;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "parish-hub")]
#[command(about = "Parish community API server")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port override (defaults to config.toml [server].port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply database migrations (requires the `db` feature)
    Migrate,
    /// Drain queued notifications through the email/push providers
    Dispatch,
}

#[cfg(feature = "db")]
async fn build_storage() -> Result<Arc<dyn Storage>, Box<dyn std::error::Error>> {
    let storage = parish_hub::storage::LibsqlStorage::new().await?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "db"))]
async fn build_storage() -> Result<Arc<dyn Storage>, Box<dyn std::error::Error>> {
    println!("⚠️  Built without the `db` feature; using in-memory storage");
    Ok(Arc::new(parish_hub::storage::InMemoryStorage::new()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    parish_hub::logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port } => {
            parish_hub::metrics::init_metrics();
            let port = port.unwrap_or(config.server.port);
            let storage = build_storage().await?;
            let state = Arc::new(AppState::from_config(storage, &config));
            info!("Starting parish-hub server on port {}", port);
            parish_hub::server::start_server(state, port).await?;
        }
        Commands::Migrate => {
            #[cfg(feature = "db")]
            {
                let storage = parish_hub::storage::LibsqlStorage::new().await?;
                storage.run_migrations().await?;
                println!("✅ Migrations applied");
            }
            #[cfg(not(feature = "db"))]
            {
                error!("Migrate requires the `db` feature");
                println!("❌ This build has no database support; rebuild with --features db");
            }
        }
        Commands::Dispatch => {
            println!("📣 Dispatching queued notifications...");
            let storage = build_storage().await?;
            let state = Arc::new(AppState::from_config(storage, &config));
            match state.notify.dispatch_queued().await {
                Ok(summaries) => {
                    println!("✅ Dispatched {} notification(s)", summaries.len());
                    for s in &summaries {
                        println!(
                            "   {}: {} emails ({} failed), {} pushes ({} failed)",
                            s.notification_id, s.emails_sent, s.emails_failed, s.pushes_sent, s.pushes_failed
                        );
                    }
                }
                Err(e) => {
                    error!("Dispatch failed: {}", e);
                    println!("❌ Dispatch failed: {}", e);
                }
            }
        }
    }
    Ok(())
}
