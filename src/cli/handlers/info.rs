//! Information display handlers (stats, config)

use crate::cli::output::print_config;
use crate::cli::output::print_statistics;
use crate::database::Database;
use crate::database::DocumentRegistry;
use crate::AppConfig;
use crate::Result;

pub async fn handle_stats_command(config: &AppConfig) -> Result<()> {
    let database = Database::from_config(config).await?;
    database
        .verify_schema_or_error(config.embedding_dimension())
        .await?;
    let stats = database.stats().await?;
    // The answer cache lives in the server process, so none to report here
    print_statistics(&stats, None);
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) {
    print_config(config);
}
