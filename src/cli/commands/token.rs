use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{Role, TokenService};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a token with SECRET_KEY")]
    Issue {
        #[arg(help = "Email claim")]
        email: String,
        #[arg(long, default_value = "", help = "Account id claim (empty for the site owner)")]
        user_id: String,
        #[arg(long, default_value_t = 0, help = "Role: 0 = user, 1 = admin")]
        role: i64,
    },

    #[command(about = "Check a token's signature and expiry and print its claims")]
    Verify {
        #[arg(help = "Encoded JWT")]
        token: String,
    },
}

fn token_service() -> anyhow::Result<TokenService> {
    let config = AppConfig::from_env().context("loading configuration")?;
    Ok(TokenService::new(
        &config.security.secret_key,
        config.security.jwt_expiry_hours,
    )?)
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let tokens = token_service()?;

    match cmd {
        TokenCommands::Issue { email, user_id, role } => {
            let role = Role::try_from(role).map_err(anyhow::Error::msg)?;
            let token = tokens.issue(&email, &user_id, role)?;
            output_format.emit(&json!({ "token": token }), || token.clone())
        }
        TokenCommands::Verify { token } => {
            let claims = tokens.validate(&token)?;
            output_format.emit(&claims, || {
                format!(
                    "email:   {}\nuser_id: {}\nrole:    {}\nexpires: {}",
                    claims.email,
                    if claims.user_id.is_empty() { "-" } else { &claims.user_id },
                    claims.role,
                    chrono::DateTime::from_timestamp(claims.exp, 0)
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| claims.exp.to_string()),
                )
            })
        }
    }
}
