use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::auth::Role;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{User, USERS};
use crate::database::{open_store, Repository, Update};
use crate::filter::Filter;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Change an account's role, e.g. to promote the first admin")]
    SetRole {
        #[arg(help = "Account email")]
        email: String,
        #[arg(help = "Role: 0 = user, 1 = admin")]
        role: i64,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::SetRole { email, role } => {
            let role = Role::try_from(role).map_err(anyhow::Error::msg)?;

            let config = AppConfig::from_env().context("loading configuration")?;
            let store = open_store(&config.store).await.context("opening document store")?;
            let users: Repository<User> = Repository::new(
                USERS,
                store,
                Duration::from_secs(config.store.operation_timeout_secs),
            );

            let result = users
                .update_one(
                    Filter::new().eq("email", email.as_str()),
                    Update::stamped(Utc::now()).set("role", i64::from(role)),
                )
                .await?;
            if result.matched == 0 {
                anyhow::bail!("no account with email {}", email);
            }

            output_format.emit(&json!({ "email": email, "role": role }), || {
                format!("{} is now {}", email, role)
            })
        }
    }
}
