use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{admin_config, connect_store, output_success};
use crate::cli::OutputFormat;
use crate::database::models::UserInfo;
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a staff account (password policy applies)")]
    CreateStaff {
        #[arg(long, help = "Username")]
        username: String,
        #[arg(long, help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Delete a user with their patient profile and mappings")]
    Delete {
        #[arg(long, help = "Username")]
        username: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = admin_config()?;
    let users = UserService::new(connect_store(&config).await?);

    match cmd {
        UserCommands::CreateStaff {
            username,
            email,
            password,
        } => {
            let user = users
                .create_account(&username, &email, &password, true, &config.password)
                .await
                .map_err(|e| match e.field_errors() {
                    Some(fields) => anyhow::anyhow!("{}: {:?}", e, fields),
                    None => anyhow::anyhow!("{}", e),
                })?;

            let info = UserInfo::from(&user);
            output_success(
                output_format,
                &format!("Created staff user '{}' ({})", info.username, info.id),
                Some(json!({ "user": info })),
            )
        }
        UserCommands::Delete { username } => {
            users
                .delete_by_username(&username)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            output_success(output_format, &format!("Deleted user '{}'", username), None)
        }
    }
}
