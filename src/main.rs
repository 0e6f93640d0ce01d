use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use hazard_ingest::domain::ProviderMeta;
use hazard_ingest::pipeline::normalize;
use hazard_ingest::pipeline::storage::{InMemoryStorage, Storage};
use hazard_ingest::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "hazard-ingest")]
#[command(about = "Hazard report ingestion and normalization service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ingestion HTTP API
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Normalize a single payload file and print the canonical fragment
    Normalize {
        /// Record type: bulletin, observation or weather
        #[arg(long)]
        record_type: String,
        /// Path to a JSON payload file
        #[arg(long)]
        file: PathBuf,
        /// Provider id attached to the fragment
        #[arg(long, default_value = "local")]
        provider_id: String,
        /// Provider name attached to the fragment
        #[arg(long, default_value = "Local File")]
        provider_name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            metrics::init_metrics();
            let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
            server::start_server(storage, port).await?;
        }
        Commands::Normalize {
            record_type,
            file,
            provider_id,
            provider_name,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading payload file {}", file.display()))?;
            let payload: serde_json::Value =
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;
            let provider_meta = ProviderMeta {
                provider_id,
                provider_name,
            };
            match normalize::dispatch(&record_type, &payload, &provider_meta) {
                Ok(fragment) => println!("{}", serde_json::to_string_pretty(&fragment)?),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(2);
                }
            }
        }
    }
    Ok(())
}
