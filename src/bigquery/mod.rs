mod auth;
mod client;
pub mod statements;

pub use client::BigQueryClient;

use crate::error::Result;
use crate::models::AdAccount;
use async_trait::async_trait;
use std::fmt;

/// Fully-qualified BigQuery table, `project.dataset.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn new(project: &str, dataset: &str, table: &str) -> Self {
        Self {
            project: project.to_string(),
            dataset: dataset.to_string(),
            table: table.to_string(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

#[async_trait]
pub trait WarehouseOperations {
    /// Create or overwrite `table` so that it holds exactly `account`.
    async fn replace_table(&self, table: &TableRef, account: &AdAccount) -> Result<()>;

    /// Upsert every row of `source` into `target`, keyed on `account_id`.
    async fn merge(&self, target: &TableRef, source: &TableRef) -> Result<()>;

    /// Drop `table`. A table that does not exist is not an error.
    async fn delete_table(&self, table: &TableRef) -> Result<()>;
}
