use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::connect_postgres;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    let store = connect_postgres(&config.store)
        .await
        .context("connecting to DATABASE_URL")?;
    store.migrate().await.context("applying document schema")?;

    output_format.emit(&json!({ "success": true, "migrated": true }), || {
        "Document schema is up to date".to_string()
    })
}
