//! Standard SQL for staging and merging ad account snapshots.

use crate::bigquery::TableRef;
use crate::models::AdAccount;
use google_bigquery2::api::{QueryParameter, QueryParameterType, QueryParameterValue};

// Bounds the lifetime of a staging table whose cleanup delete failed.
const STAGING_EXPIRATION: &str = "TIMESTAMP_ADD(CURRENT_TIMESTAMP(), INTERVAL 1 HOUR)";

fn quoted(table: &TableRef) -> String {
    format!("`{}`", table)
}

/// Replace `table` with a single row built from named query parameters, one per column.
pub fn replace_table_statement(table: &TableRef) -> String {
    let select_list = AdAccount::COLUMNS
        .iter()
        .map(|column| format!("  @{column} AS {column}"))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "CREATE OR REPLACE TABLE {}\nOPTIONS (expiration_timestamp = {})\nAS SELECT\n{}",
        quoted(table),
        STAGING_EXPIRATION,
        select_list
    )
}

/// Update-if-present, insert-if-absent from `source` into `target` on the account key.
pub fn merge_statement(target: &TableRef, source: &TableRef) -> String {
    let key = AdAccount::KEY;
    let update_set = AdAccount::COLUMNS
        .iter()
        .filter(|column| **column != key)
        .map(|column| format!("    {column} = S.{column}"))
        .collect::<Vec<_>>()
        .join(",\n");
    let insert_columns = AdAccount::COLUMNS.join(", ");
    let insert_values = AdAccount::COLUMNS
        .iter()
        .map(|column| format!("S.{column}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "MERGE {target} T\n\
         USING {source} S\n\
         ON T.{key} = S.{key}\n\
         WHEN MATCHED THEN\n  UPDATE SET\n{update_set}\n\
         WHEN NOT MATCHED THEN\n  INSERT ({insert_columns})\n  VALUES ({insert_values})",
        target = quoted(target),
        source = quoted(source),
    )
}

/// Typed parameters binding `account` to the placeholders of [`replace_table_statement`].
pub fn row_parameters(account: &AdAccount) -> Vec<QueryParameter> {
    vec![
        parameter("account_id", "STRING", Some(account.account_id.clone())),
        parameter("name", "STRING", Some(account.name.clone())),
        parameter(
            "account_status",
            "INT64",
            Some(account.account_status.to_string()),
        ),
        parameter(
            "amount_spent",
            "FLOAT64",
            Some(account.amount_spent.to_string()),
        ),
        parameter("balance", "FLOAT64", Some(account.balance.to_string())),
        parameter("currency", "STRING", Some(account.currency.clone())),
        parameter(
            "spend_cap",
            "FLOAT64",
            account.spend_cap.map(|cap| cap.to_string()),
        ),
        parameter("created_time", "STRING", Some(account.created_time.clone())),
        parameter("timezone_name", "STRING", Some(account.timezone_name.clone())),
        parameter("business_name", "STRING", Some(account.business_name.clone())),
        parameter("business_city", "STRING", Some(account.business_city.clone())),
        parameter(
            "business_country_code",
            "STRING",
            Some(account.business_country_code.clone()),
        ),
        parameter(
            "disable_reason",
            "STRING",
            Some(account.disable_reason.clone()),
        ),
        parameter("is_personal", "BOOL", Some(account.is_personal.to_string())),
        parameter(
            "is_prepay_account",
            "BOOL",
            Some(account.is_prepay_account.to_string()),
        ),
        parameter("updated_at", "TIMESTAMP", Some(account.updated_at_iso())),
    ]
}

// A parameter without a value binds SQL NULL of the given type.
fn parameter(name: &str, type_: &str, value: Option<String>) -> QueryParameter {
    QueryParameter {
        name: Some(name.to_string()),
        parameter_type: Some(QueryParameterType {
            type_: Some(type_.to_string()),
            ..Default::default()
        }),
        parameter_value: Some(QueryParameterValue {
            value,
            ..Default::default()
        }),
        ..Default::default()
    }
}
