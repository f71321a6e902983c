use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use redline_db::{Database, SqliteDatabase};
use redline_prompts::load_guidelines;
use redline_service::{LocalService, OpenAiBackend};
use tokio::net::TcpListener;
use tracing::{info, warn};

use redline_server::config::ServerConfig;

#[derive(Parser)]
#[command(name = "redline-server", about = "Writing assistant with traced rewrites and feedback")]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List recent traced rewrite calls
    Calls {
        /// Maximum number of calls to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print one call and its feedback as JSON
    ShowCall {
        /// The call ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db = Arc::new(SqliteDatabase::open(&cli.config.db_config()).context("open call store")?);

    match cli.command {
        Some(Commands::Calls { limit }) => {
            let calls = db.list_calls(limit).await?;
            if calls.is_empty() {
                eprintln!("No calls recorded.");
            } else {
                println!("{:<38} {:<10} {:<34} FEEDBACK", "ID", "STATUS", "STARTED");
                for call in calls {
                    let feedback = db.list_annotations(&call.id).await?.len();
                    println!(
                        "{:<38} {:<10} {:<34} {}",
                        call.id,
                        call.status.as_str(),
                        call.started_at.to_rfc3339(),
                        feedback,
                    );
                }
            }
        }
        Some(Commands::ShowCall { id }) => {
            let call = db.get_call(&id).await?;
            let annotations = db.list_annotations(&id).await?;
            let detail = redline_core::CallDetail { call, annotations };
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        None => {
            let config = cli.config;
            let guidelines = load_guidelines(&config.guidelines).with_context(|| {
                format!("read guidelines from {}", config.guidelines.display())
            })?;

            if config.api_key.is_none() {
                warn!("OPENAI_API_KEY is not set; requests will be sent unauthenticated");
            }
            let backend = Arc::new(OpenAiBackend::new(&config.openai_config())?);
            info!("generation service: {} (model={})", config.api_base, config.model);

            let service = Arc::new(LocalService::new(db, backend, guidelines));

            let addr = config.socket_addr();
            let listener = TcpListener::bind(addr).await?;
            info!("redline-server listening on http://{addr}");

            redline_server::serve(listener, service).await?;
        }
    }

    Ok(())
}
