use crate::bigquery::{TableRef, WarehouseOperations};
use crate::config::BigQueryConfig;
use crate::error::Result;
use crate::facebook::GraphOperations;
use crate::facebook::types::RawAdAccount;
use crate::models::AdAccount;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

/// Normalize a raw ad account, stamping it with the current time as `updated_at`.
pub fn transform(account: Option<&RawAdAccount>) -> Result<Option<AdAccount>> {
    let updated_at = Utc::now();
    account
        .map(|raw| AdAccount::from_raw(raw, updated_at))
        .transpose()
}

pub struct SyncEngine<GC, WC> {
    graph_client: GC,
    warehouse_client: WC,
    table: TableRef,
    staging_table: TableRef,
}

impl<GC, WC> SyncEngine<GC, WC>
where
    GC: GraphOperations + Sync,
    WC: WarehouseOperations + Sync,
{
    pub fn new(config: &BigQueryConfig, graph_client: GC, warehouse_client: WC) -> Self {
        Self {
            graph_client,
            warehouse_client,
            table: config.table(),
            staging_table: config.staging_table(),
        }
    }

    /// Fetch, transform and upsert one ad account.
    ///
    /// A failed fetch ends the run quietly. Transform and upsert errors are returned.
    #[instrument(name = "Sync", skip(self))]
    pub async fn run(&self, account_id: &str) -> Result<()> {
        info!(table = %self.table, "Facebook Ads to BigQuery - Upsert Mode");

        let Some(raw) = self.fetch_ad_account(account_id).await else {
            info!("No account data");
            return Ok(());
        };

        let account = transform(Some(&raw))?;
        info!("Transformed 1 record");

        self.upsert(account.as_ref()).await?;
        info!("Pipeline completed");

        Ok(())
    }

    /// Fetch errors are logged and reported as no data.
    pub async fn fetch_ad_account(&self, account_id: &str) -> Option<RawAdAccount> {
        match self.graph_client.get_ad_account(account_id).await {
            Ok(account) => {
                let name = account
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or(account_id);
                info!(account = %name, "Fetched account");
                Some(account)
            }
            Err(e) => {
                warn!(error = %e, "Error fetching account");
                None
            }
        }
    }

    /// Stage `account` next to the destination table, merge it in and drop the staging table.
    ///
    /// On failure the staging table is dropped on a best-effort basis and the first
    /// error is returned.
    pub async fn upsert(&self, account: Option<&AdAccount>) -> Result<()> {
        let Some(account) = account else {
            info!("No data to upsert");
            return Ok(());
        };

        match self.stage_and_merge(account).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Error upserting to BigQuery");
                self.discard_staging_table().await;
                Err(e)
            }
        }
    }

    async fn stage_and_merge(&self, account: &AdAccount) -> Result<()> {
        self.warehouse_client
            .replace_table(&self.staging_table, account)
            .await?;
        info!(table = %self.staging_table, "Loaded data to temp table");

        self.warehouse_client
            .merge(&self.table, &self.staging_table)
            .await?;
        info!(table = %self.table, "Upserted data");

        self.warehouse_client
            .delete_table(&self.staging_table)
            .await?;
        info!("Cleaned up temp table");

        Ok(())
    }

    // Cleanup errors are dropped here; the caller already holds the error that matters.
    async fn discard_staging_table(&self) {
        if let Err(e) = self.warehouse_client.delete_table(&self.staging_table).await {
            debug!(error = %e, "Ignoring failed temp table cleanup");
        }
    }
}
