use crate::config::Config;
use crate::error::Result;
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// Show the resolved configuration and table names
    Config,
}

impl ShowResource {
    pub async fn execute(&self) -> Result<()> {
        match self {
            ShowResource::Config => show_config(),
        }
    }
}

fn show_config() -> Result<()> {
    let config = Config::from_env()?;

    info!(config = ?config.facebook, "Facebook");
    info!(config = ?config.bigquery, "BigQuery");
    info!(
        url = %config.facebook.account_url(&config.facebook.account_id),
        "Ad account node"
    );
    info!(table = %config.bigquery.table(), "Destination table");
    info!(table = %config.bigquery.staging_table(), "Temp table");

    Ok(())
}
