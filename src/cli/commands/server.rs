use clap::Subcommand;
use serde_json::Value;
use std::time::Duration;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from API /health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:8000", help = "Server base URL")]
        url: String,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => {
            let endpoint = format!("{}/health", url.trim_end_matches('/'));
            let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;

            let response = client.get(&endpoint).send().await?;
            let status = response.status();
            let body: Value = response.json().await?;

            if !status.is_success() {
                anyhow::bail!("{} reported {}: {}", endpoint, status, body);
            }

            output_success(output_format, &format!("{} is healthy", url), body.get("data").cloned())
        }
    }
}
