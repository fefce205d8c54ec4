use clap::Subcommand;
use serde_json::json;

use crate::auth::{hash_password, is_acceptable_password, MIN_PASSWORD_LENGTH};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Print the argon2 hash of a password")]
    Hash {
        #[arg(help = "Plaintext password")]
        password: String,
    },
}

pub async fn handle(cmd: PasswordCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PasswordCommands::Hash { password } => {
            if !is_acceptable_password(&password) {
                anyhow::bail!("password must be at least {} characters", MIN_PASSWORD_LENGTH);
            }
            let hash = hash_password(&password)?;
            output_format.emit(&json!({ "hash": hash }), || hash.clone())
        }
    }
}
