use super::{AD_ACCOUNT_FIELDS, GraphOperations};
use crate::config::FacebookConfig;
use crate::error::{AppError, Result};
use crate::facebook::types::{GraphErrorResponse, RawAdAccount};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

pub struct GraphClient {
    client: Client,
    config: FacebookConfig,
}

impl GraphClient {
    pub fn new(config: &FacebookConfig) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Facebook(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl GraphOperations for GraphClient {
    // The access token travels as a query parameter, so reqwest errors are
    // stripped of their URL before they can reach a log line.
    #[instrument(name = "Fetching ad account", skip(self))]
    async fn get_ad_account(&self, account_id: &str) -> Result<RawAdAccount> {
        let url = self.config.account_url(account_id);
        let fields = AD_ACCOUNT_FIELDS.join(",");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields", fields.as_str()),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<GraphErrorResponse>(&body) {
                Ok(graph) => graph.error.to_string(),
                Err(_) => body,
            };
            return Err(AppError::Facebook(format!(
                "Failed to fetch ad account: {} - {}",
                status, detail
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        match body {
            Value::Object(account) => Ok(account),
            other => Err(AppError::Facebook(format!(
                "Expected an ad account object, got: {}",
                other
            ))),
        }
    }
}
