pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::ApiClient;
use crate::database::DatabaseManager;
use crate::seed;

#[derive(Parser)]
#[command(name = "parish")]
#[command(about = "Parish CLI - administration for the church content API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Port to bind (defaults to PARISH_API_PORT, PORT, then 3000)")]
        port: Option<u16>,
    },

    #[command(about = "Create tables and load fixture content")]
    Seed,

    #[command(about = "Check connectivity against a running server")]
    Health {
        #[arg(long, default_value = "http://127.0.0.1:3000", help = "Server base URL")]
        url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port } => crate::routes::serve(port).await,

        Commands::Seed => {
            let pool = DatabaseManager::main_pool().await?;
            let summary = seed::run(&pool).await?;
            DatabaseManager::close_all().await;

            utils::output_success(
                &output_format,
                "Seed complete",
                Some(json!({
                    "zones": summary.zones,
                    "cell_groups": summary.cell_groups,
                    "content_records": summary.content_records,
                    "admin_created": summary.admin_created,
                })),
            )
        }

        Commands::Health { url } => {
            let client = ApiClient::new(url.clone());
            match client.probe().await {
                Ok(true) => utils::output_success(
                    &output_format,
                    &format!("Server at {} is healthy", url),
                    None,
                ),
                Ok(false) => utils::output_error(
                    &output_format,
                    &format!("Server at {} responded but is degraded", url),
                    Some("DEGRADED"),
                ),
                Err(e) => utils::output_error(
                    &output_format,
                    &format!("Server at {} is unreachable: {}", url, e),
                    Some("UNREACHABLE"),
                ),
            }
        }
    }
}
