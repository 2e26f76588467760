use crate::error::{AppError, Result};
use crate::facebook::types::RawAdAccount;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of one ad account, shaped like a row of the destination table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdAccount {
    pub account_id: String,
    pub name: String,
    pub account_status: i64,
    pub amount_spent: f64,
    pub balance: f64,
    pub currency: String,
    /// `None` means the account has no spend cap.
    pub spend_cap: Option<f64>,
    pub created_time: String,
    pub timezone_name: String,
    pub business_name: String,
    pub business_city: String,
    pub business_country_code: String,
    pub disable_reason: String,
    pub is_personal: bool,
    pub is_prepay_account: bool,
    pub updated_at: DateTime<Utc>,
}

impl AdAccount {
    /// Merge key of the destination table.
    pub const KEY: &'static str = "account_id";

    /// Destination columns in table order.
    pub const COLUMNS: &'static [&'static str] = &[
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
        "updated_at",
    ];

    /// Coerce a Graph API ad account into the destination schema, stamping `updated_at`.
    ///
    /// Absent fields take the column default: empty text, status 0, zero amounts,
    /// false flags and no spend cap.
    pub fn from_raw(raw: &RawAdAccount, updated_at: DateTime<Utc>) -> Result<Self> {
        Ok(AdAccount {
            account_id: text(raw, "account_id"),
            name: text(raw, "name"),
            account_status: integer(raw, "account_status")?,
            amount_spent: amount(raw, "amount_spent")?,
            balance: amount(raw, "balance")?,
            currency: text(raw, "currency"),
            spend_cap: optional_amount(raw, "spend_cap")?,
            created_time: text(raw, "created_time"),
            timezone_name: text(raw, "timezone_name"),
            business_name: text(raw, "business_name"),
            business_city: text(raw, "business_city"),
            business_country_code: text(raw, "business_country_code"),
            disable_reason: text(raw, "disable_reason"),
            is_personal: flag(raw, "is_personal")?,
            is_prepay_account: flag(raw, "is_prepay_account")?,
            updated_at,
        })
    }

    /// `updated_at` as ISO-8601 with microsecond precision and an explicit UTC offset.
    pub fn updated_at_iso(&self) -> String {
        self.updated_at.to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

fn present<'a>(raw: &'a RawAdAccount, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| !v.is_null())
}

fn text(raw: &RawAdAccount, key: &str) -> String {
    match present(raw, key) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn integer(raw: &RawAdAccount, key: &str) -> Result<i64> {
    match present(raw, key) {
        None => Ok(0),
        Some(Value::Number(n)) if n.is_i64() => Ok(n.as_i64().unwrap_or_default()),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid(key, "an integer", s)),
        Some(other) => Err(invalid(key, "an integer", other)),
    }
}

fn amount(raw: &RawAdAccount, key: &str) -> Result<f64> {
    match present(raw, key) {
        None => Ok(0.0),
        Some(value) => to_f64(key, value),
    }
}

// Falsy values (null, false, 0, "") mean "no cap". A non-empty string such as
// "0" is kept as a cap of zero.
fn optional_amount(raw: &RawAdAccount, key: &str) -> Result<Option<f64>> {
    match raw.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(value) => to_f64(key, value).map(Some),
    }
}

fn to_f64(key: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid(key, "a number", n)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid(key, "a number", s)),
        other => Err(invalid(key, "a number", other)),
    }
}

fn flag(raw: &RawAdAccount, key: &str) -> Result<bool> {
    match present(raw, key) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(invalid(key, "a boolean", s)),
        },
        Some(other) => Err(invalid(key, "a boolean", other)),
    }
}

fn invalid(key: &str, expected: &str, got: impl std::fmt::Debug) -> AppError {
    AppError::Transform(format!("{} must be {}, got {:?}", key, expected, got))
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawAdAccount {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_from_raw_full_record() {
        let account = test_helpers::mock_ad_account("123");

        assert_eq!(
            account,
            AdAccount {
                account_id: "123".to_string(),
                name: "Acme".to_string(),
                account_status: 1,
                amount_spent: 5050.0,
                balance: 120.0,
                currency: "VND".to_string(),
                spend_cap: Some(1_000_000.0),
                created_time: "2019-05-03T10:00:00+0700".to_string(),
                timezone_name: "Asia/Ho_Chi_Minh".to_string(),
                business_name: "Acme Co".to_string(),
                business_city: "Hanoi".to_string(),
                business_country_code: "VN".to_string(),
                disable_reason: "0".to_string(),
                is_personal: false,
                is_prepay_account: true,
                updated_at: test_helpers::mock_datetime(2025, 1, 1),
            }
        );
    }

    #[test]
    fn test_from_raw_partial_record() {
        let input = raw(json!({
            "account_id": "123",
            "name": "Acme",
            "amount_spent": "50.5",
            "spend_cap": null,
            "is_personal": true
        }));
        let updated_at = test_helpers::mock_datetime(2025, 6, 1);

        let account = AdAccount::from_raw(&input, updated_at).unwrap();

        assert_eq!(account.amount_spent, 50.5);
        assert_eq!(account.spend_cap, None);
        assert!(account.is_personal);
        assert!(!account.is_prepay_account);
        assert_eq!(account.account_status, 0);
        assert_eq!(account.balance, 0.0);
        assert_eq!(account.currency, "");
        assert_eq!(account.disable_reason, "");
        assert_eq!(account.updated_at, updated_at);
    }

    #[test]
    fn test_from_raw_empty_record() {
        let account = AdAccount::from_raw(&RawAdAccount::new(), Utc::now()).unwrap();

        assert_eq!(account.account_id, "");
        assert_eq!(account.name, "");
        assert_eq!(account.account_status, 0);
        assert_eq!(account.amount_spent, 0.0);
        assert_eq!(account.spend_cap, None);
        assert!(!account.is_personal);
    }

    #[test]
    fn test_spend_cap_falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            let input = raw(json!({ "spend_cap": value.clone() }));
            let account = AdAccount::from_raw(&input, Utc::now()).unwrap();
            assert_eq!(account.spend_cap, None, "spend_cap {value} should mean no cap");
        }
    }

    #[test]
    fn test_spend_cap_truthy_values() {
        let cases = [
            (json!("0"), 0.0),
            (json!("2500"), 2500.0),
            (json!(12.5), 12.5),
            (json!(7), 7.0),
        ];
        for (value, expected) in cases {
            let input = raw(json!({ "spend_cap": value.clone() }));
            let account = AdAccount::from_raw(&input, Utc::now()).unwrap();
            assert_eq!(account.spend_cap, Some(expected), "spend_cap {value}");
        }
    }

    #[test]
    fn test_numeric_fields_accept_numbers_and_strings() {
        let input = raw(json!({
            "account_status": "2",
            "amount_spent": 10,
            "balance": " 3.25 "
        }));

        let account = AdAccount::from_raw(&input, Utc::now()).unwrap();

        assert_eq!(account.account_status, 2);
        assert_eq!(account.amount_spent, 10.0);
        assert_eq!(account.balance, 3.25);
    }

    #[test]
    fn test_invalid_amount_is_transform_error() {
        let input = raw(json!({ "amount_spent": "lots" }));

        let err = AdAccount::from_raw(&input, Utc::now()).unwrap_err();

        assert!(matches!(err, AppError::Transform(msg) if msg.contains("amount_spent")));
    }

    #[test]
    fn test_invalid_status_is_transform_error() {
        let input = raw(json!({ "account_status": 1.5 }));

        assert!(AdAccount::from_raw(&input, Utc::now()).is_err());
    }

    #[test]
    fn test_flags() {
        let input = raw(json!({ "is_personal": 1, "is_prepay_account": "false" }));
        let account = AdAccount::from_raw(&input, Utc::now()).unwrap();
        assert!(account.is_personal);
        assert!(!account.is_prepay_account);

        let input = raw(json!({ "is_personal": "maybe" }));
        assert!(AdAccount::from_raw(&input, Utc::now()).is_err());
    }

    #[test]
    fn test_text_fields_render_numbers() {
        let input = raw(json!({ "disable_reason": 3, "account_id": 123 }));

        let account = AdAccount::from_raw(&input, Utc::now()).unwrap();

        assert_eq!(account.disable_reason, "3");
        assert_eq!(account.account_id, "123");
    }

    #[test]
    fn test_updated_at_iso() {
        let account = test_helpers::mock_ad_account("123");

        assert_eq!(account.updated_at_iso(), "2025-01-01T10:00:00.000000+00:00");
    }

    #[test]
    fn test_columns_cover_every_field() {
        let account = test_helpers::mock_ad_account("123");
        let value = serde_json::to_value(&account).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), AdAccount::COLUMNS.len());
        for column in AdAccount::COLUMNS {
            assert!(object.contains_key(*column), "missing column {column}");
        }
        assert_eq!(AdAccount::COLUMNS[0], AdAccount::KEY);
    }
}
