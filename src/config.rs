use crate::bigquery::TableRef;
use crate::error::{AppError, Result};
use std::fmt;
use url::Url;

const DEFAULT_ACCOUNT_ID: &str = "1125850342079893";
const DEFAULT_API_VERSION: &str = "v24.0";
const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_PROJECT_ID: &str = "atino-vietnam";
const DEFAULT_DATASET_ID: &str = "san_xuat";
const DEFAULT_TABLE_ID: &str = "ad_accounts";

// Suffix of the per-run staging table, next to the destination table.
const STAGING_SUFFIX: &str = "_temp";

#[derive(Debug, Clone)]
pub struct Config {
    pub facebook: FacebookConfig,
    pub bigquery: BigQueryConfig,
}

#[derive(Clone)]
pub struct FacebookConfig {
    pub access_token: String,
    pub account_id: String,
    pub api_version: String,
    pub graph_url: String,
    pub timeout_secs: u64,
}

impl FacebookConfig {
    /// Graph API node for an ad account.
    pub fn account_url(&self, account_id: &str) -> String {
        format!(
            "{}/{}/act_{}",
            self.graph_url.trim_end_matches('/'),
            self.api_version,
            account_id
        )
    }
}

impl fmt::Debug for FacebookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacebookConfig")
            .field("access_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("api_version", &self.api_version)
            .field("graph_url", &self.graph_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    /// Job location, e.g. `US` or `asia-southeast1`. BigQuery infers it when unset.
    pub location: Option<String>,
}

impl BigQueryConfig {
    pub fn table(&self) -> TableRef {
        TableRef::new(&self.project_id, &self.dataset_id, &self.table_id)
    }

    pub fn staging_table(&self) -> TableRef {
        TableRef::new(
            &self.project_id,
            &self.dataset_id,
            &format!("{}{}", self.table_id, STAGING_SUFFIX),
        )
    }
}

impl Config {
    /// Load configuration from the process environment, after merging any `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let access_token = var("FB_ACCESS_TOKEN").ok_or_else(|| {
            AppError::Config("FB_ACCESS_TOKEN environment variable is required".to_string())
        })?;

        let graph_url = var_or("FB_GRAPH_URL", DEFAULT_GRAPH_URL);
        Url::parse(&graph_url)
            .map_err(|e| AppError::Config(format!("Invalid FB_GRAPH_URL {:?}: {}", graph_url, e)))?;

        let timeout_secs = match var("FB_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let facebook = FacebookConfig {
            access_token,
            account_id: normalize_account_id(&var_or("ACCOUNT_ID", DEFAULT_ACCOUNT_ID)),
            api_version: var_or("FB_API_VERSION", DEFAULT_API_VERSION),
            graph_url,
            timeout_secs,
        };

        let bigquery = BigQueryConfig {
            project_id: var_or("PROJECT_ID", DEFAULT_PROJECT_ID),
            dataset_id: var_or("DATASET_ID", DEFAULT_DATASET_ID),
            table_id: var_or("TABLE_ID", DEFAULT_TABLE_ID),
            location: var("BIGQUERY_LOCATION"),
        };

        Ok(Config { facebook, bigquery })
    }
}

/// Ad account ids are accepted with or without the `act_` node prefix.
pub fn normalize_account_id(account_id: &str) -> String {
    let trimmed = account_id.trim();
    trimmed.strip_prefix("act_").unwrap_or(trimmed).to_string()
}

fn parse_timeout(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::Config(format!(
            "FB_TIMEOUT_SECS must be a positive integer, got {:?}",
            raw
        ))),
    }
}
