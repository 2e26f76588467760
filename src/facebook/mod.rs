mod client;
pub mod types;

pub use client::GraphClient;

use crate::error::Result;
use async_trait::async_trait;
use types::RawAdAccount;

/// Fields requested from the ad account node. Every destination column except `updated_at`.
pub const AD_ACCOUNT_FIELDS: &[&str] = &[
    "account_id",
    "name",
    "account_status",
    "amount_spent",
    "balance",
    "currency",
    "spend_cap",
    "created_time",
    "timezone_name",
    "business_name",
    "business_city",
    "business_country_code",
    "disable_reason",
    "is_personal",
    "is_prepay_account",
];

#[async_trait]
pub trait GraphOperations {
    async fn get_ad_account(&self, account_id: &str) -> Result<RawAdAccount>;
}
