pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::AppState;

use anyhow::Context;

use crate::auth::TokenService;
use crate::config::AppConfig;

/// Wire the store, token service and mailer described by `config`.
pub async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let tokens = TokenService::new(&config.security.secret_key, config.security.jwt_expiry_hours)
        .context("initialising token service")?;
    let store = database::open_store(&config.store)
        .await
        .context("opening document store")?;
    let mailer = mail::mailer_from_config(&config.mail).context("configuring mail relay")?;

    Ok(AppState::new(config, tokens, store, mailer))
}
