use super::WarehouseOperations;
use crate::bigquery::TableRef;
use crate::bigquery::auth::create_and_verify_authenticator;
use crate::bigquery::statements::{merge_statement, replace_table_statement, row_parameters};
use crate::config::BigQueryConfig;
use crate::error::{AppError, Result};
use crate::models::AdAccount;
use anyhow::Context;
use async_trait::async_trait;
use google_bigquery2::Bigquery;
use google_bigquery2::api::{QueryParameter, QueryRequest, Scope};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use serde_json::Value;
use tracing::{debug, instrument};

pub(crate) const AUTH_SCOPE: Scope = Scope::CloudPlatform;

// How long a single jobs.query / jobs.getQueryResults call blocks server-side.
const QUERY_TIMEOUT_MS: u32 = 10_000;

pub struct BigQueryClient {
    hub: Bigquery<HttpsConnector<HttpConnector>>,
    project_id: String,
    location: Option<String>,
}

impl BigQueryClient {
    /// Create a new BigQueryClient with authenticated access
    #[instrument(name = "Authenticating to BigQuery", skip_all)]
    pub async fn new(config: &BigQueryConfig) -> Result<Self> {
        let auth = create_and_verify_authenticator().await?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .context("Failed to load native root certificates")?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector);

        Ok(Self {
            hub: Bigquery::new(client, auth),
            project_id: config.project_id.clone(),
            location: config.location.clone(),
        })
    }

    /// Run a standard SQL statement as a query job and wait for it to finish.
    async fn run_query(&self, sql: String, parameters: Vec<QueryParameter>) -> Result<()> {
        let parameter_mode = (!parameters.is_empty()).then(|| "NAMED".to_string());
        let request = QueryRequest {
            query: Some(sql),
            use_legacy_sql: Some(false),
            parameter_mode,
            query_parameters: Some(parameters),
            location: self.location.clone(),
            timeout_ms: Some(QUERY_TIMEOUT_MS),
            ..Default::default()
        };

        let (_, response) = self
            .hub
            .jobs()
            .query(request, &self.project_id)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| AppError::BigQuery(format!("Failed to run query: {}", e)))?;

        if response.job_complete == Some(true) {
            return Ok(());
        }

        let job = response
            .job_reference
            .ok_or_else(|| AppError::BigQuery("Query job has no job reference".to_string()))?;
        let job_id = job
            .job_id
            .ok_or_else(|| AppError::BigQuery("Query job has empty ID".to_string()))?;
        let location = job.location.or_else(|| self.location.clone());

        loop {
            debug!(%job_id, "Waiting for query job");

            let mut call = self
                .hub
                .jobs()
                .get_query_results(&self.project_id, &job_id)
                .timeout_ms(QUERY_TIMEOUT_MS)
                .max_results(0)
                .add_scope(AUTH_SCOPE);
            if let Some(location) = location.as_deref() {
                call = call.location(location);
            }

            let (_, results) = call.doit().await.map_err(|e| {
                AppError::BigQuery(format!("Query job {} failed: {}", job_id, e))
            })?;

            if results.job_complete == Some(true) {
                return Ok(());
            }
        }
    }
}

/// Whether a BigQuery API error is a 404, e.g. deleting a table that does not exist.
fn is_not_found(err: &google_bigquery2::Error) -> bool {
    match err {
        google_bigquery2::Error::BadRequest(body) => {
            body.pointer("/error/code").and_then(Value::as_i64) == Some(404)
        }
        google_bigquery2::Error::Failure(response) => response.status().as_u16() == 404,
        _ => false,
    }
}

#[async_trait]
impl WarehouseOperations for BigQueryClient {
    #[instrument(name = "Loading staging table", skip_all, fields(table = %table))]
    async fn replace_table(&self, table: &TableRef, account: &AdAccount) -> Result<()> {
        self.run_query(replace_table_statement(table), row_parameters(account))
            .await
    }

    #[instrument(name = "Merging into destination", skip_all, fields(target = %target))]
    async fn merge(&self, target: &TableRef, source: &TableRef) -> Result<()> {
        self.run_query(merge_statement(target, source), Vec::new())
            .await
    }

    #[instrument(name = "Deleting table", skip_all, fields(table = %table))]
    async fn delete_table(&self, table: &TableRef) -> Result<()> {
        let result = self
            .hub
            .tables()
            .delete(&table.project, &table.dataset, &table.table)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => {
                debug!("Table does not exist");
                Ok(())
            }
            Err(e) => Err(AppError::BigQuery(format!(
                "Failed to delete table {}: {}",
                table, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_not_found() {
        let not_found = google_bigquery2::Error::BadRequest(json!({
            "error": {
                "code": 404,
                "message": "Not found: Table proj:ds.ad_accounts_temp",
                "status": "NOT_FOUND"
            }
        }));
        let forbidden = google_bigquery2::Error::BadRequest(json!({
            "error": { "code": 403, "message": "Access Denied" }
        }));

        assert!(is_not_found(&not_found));
        assert!(!is_not_found(&forbidden));
        assert!(!is_not_found(&google_bigquery2::Error::Cancelled));
    }
}
