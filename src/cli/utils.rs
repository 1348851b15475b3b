use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::{self, AppConfig, StoreBackend};
use crate::database::{DatabaseManager, RecordStore};
use std::sync::Arc;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Configuration for admin commands. They always act on PostgreSQL: an
/// in-memory store would vanish with the process.
pub fn admin_config() -> anyhow::Result<AppConfig> {
    let mut config = config::config().clone();
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set");
    }
    config.database.backend = StoreBackend::Postgres;
    Ok(config)
}

/// Connect to the configured database for an admin command
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    Ok(DatabaseManager::connect(&config.database).await?)
}
