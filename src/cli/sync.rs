use crate::bigquery::BigQueryClient;
use crate::config::{Config, normalize_account_id};
use crate::error::Result;
use crate::facebook::GraphClient;
use crate::sync::SyncEngine;
use tracing::info;

pub async fn execute(account_id: Option<&str>) -> Result<()> {
    let config = Config::from_env()?;
    let account_id = account_id
        .map(normalize_account_id)
        .unwrap_or_else(|| config.facebook.account_id.clone());

    info!(
        project = %config.bigquery.project_id,
        dataset = %config.bigquery.dataset_id,
        table = %config.bigquery.table_id,
        account = %account_id,
        "Starting sync"
    );

    let graph_client = GraphClient::new(&config.facebook)?;
    let bigquery_client = BigQueryClient::new(&config.bigquery).await?;

    let engine = SyncEngine::new(&config.bigquery, graph_client, bigquery_client);
    engine.run(&account_id).await
}
