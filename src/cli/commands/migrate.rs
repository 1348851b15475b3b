use serde_json::json;

use crate::cli::utils::{admin_config, output_success};
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = admin_config()?;
    let pool = DatabaseManager::pool(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    output_success(output_format, "Migrations applied", Some(json!({ "migrated": true })))
}
