use serde::Deserialize;
use serde_json::{Map, Value};

/// Ad account node exactly as returned by the Graph API, keyed by field name.
///
/// Kept untyped: the Graph API mixes strings and numbers for amounts, and coercion
/// into the destination schema happens in `models::ad_account`.
pub type RawAdAccount = Map<String, Value>;

// https://developers.facebook.com/docs/graph-api/guides/error-handling
#[derive(Debug, Deserialize)]
pub(super) struct GraphErrorResponse {
    pub(super) error: GraphError,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphError {
    pub(super) message: String,
    #[serde(rename = "type", default)]
    pub(super) type_: Option<String>,
    #[serde(default)]
    pub(super) code: Option<i64>,
    #[serde(default)]
    pub(super) fbtrace_id: Option<String>,
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(type_) = &self.type_ {
            write!(f, " (type: {}", type_)?;
            if let Some(code) = self.code {
                write!(f, ", code: {}", code)?;
            }
            write!(f, ")")?;
        }
        if let Some(trace) = &self.fbtrace_id {
            write!(f, " [fbtrace_id: {}]", trace)?;
        }
        Ok(())
    }
}
