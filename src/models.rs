// Core data models for invoice-probe

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Invoice as observed through `GET /invoices`.
///
/// Only the owner and status are interpreted; every other field is kept
/// as-is in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(rename = "userId", deserialize_with = "deserialize_owner")]
    pub user_id: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InvoiceRecord {
    pub fn new(user_id: i64, status: &str) -> Self {
        Self {
            user_id,
            status: Some(status.to_string()),
            extra: Map::new(),
        }
    }
}

// Some backends serialize numeric ids as strings.
fn deserialize_owner<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("userId is not an integer")),
        Value::String(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("userId {:?} is not an integer", s))),
        other => Err(serde::de::Error::custom(format!(
            "unexpected userId value: {}",
            other
        ))),
    }
}

/// Query parameter a probe injects into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Operator,
    Status,
}

impl Field {
    pub fn as_param(&self) -> &'static str {
        match self {
            Field::Operator => "operator",
            Field::Status => "status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_param())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    OperatorInjection,
    StatusInjection,
}

impl ProbeKind {
    pub fn field(&self) -> Field {
        match self {
            ProbeKind::OperatorInjection => Field::Operator,
            ProbeKind::StatusInjection => Field::Status,
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::OperatorInjection => write!(f, "operator-injection"),
            ProbeKind::StatusInjection => write!(f, "status-injection"),
        }
    }
}

/// Baseline and adversarial result sets of one probe invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub baseline: Vec<InvoiceRecord>,
    pub injected: Vec<InvoiceRecord>,
}
