// Blocking HTTP engine for invoice-probe
// Sends authenticated GET requests to the backend under test

use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::auth::{AuthStrategy, CredentialError, SubjectAuth, TokenMinter};
use crate::config::ProbeConfig;
use crate::models::InvoiceRecord;
use crate::response_analysis::{detect_sql_error, excerpt};

pub const INVOICES_PATH: &str = "/invoices";

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Connection failures and timeouts
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{}", http_failure_message(.status, .body))]
    Http { status: u16, body: String },

    #[error("unexpected response body: {reason}: {body}")]
    MalformedBody { reason: String, body: String },
}

impl ProbeError {
    /// Signing is missing from this build; the probe should be skipped.
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, ProbeError::Credential(CredentialError::Unavailable(_)))
    }
}

fn http_failure_message(status: &u16, body: &str) -> String {
    let mut msg = format!("backend returned {}: {}", status, excerpt(body, 512));
    if let Some(hint) = detect_sql_error(body) {
        msg.push_str(&format!(" ({}; possible SQL injection)", hint));
    }
    msg
}

/// Raw status and body of one request
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct AuthenticatedClient {
    pub client: Client,
    config: ProbeConfig,
    minter: TokenMinter,
}

impl AuthenticatedClient {
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let minter = TokenMinter::from_config(&config);
        Ok(Self {
            client,
            config,
            minter,
        })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn minter(&self) -> &TokenMinter {
        &self.minter
    }

    /// GET `{base_url}{path}` as `subject`. Any status is returned as-is.
    pub fn get(&self, path: &str, params: &[(&str, &str)], subject: i64) -> Result<ProbeResponse, ProbeError> {
        let url = self.config.url_for(path);
        debug!(url = %url, subject, ?params, "sending probe request");

        let auth = SubjectAuth {
            minter: &self.minter,
            subject,
        };
        let mut req = self.client.get(&url);
        if !params.is_empty() {
            req = req.query(params);
        }
        req = auth.apply_auth(req)?;

        let resp = req.send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        debug!(url = %url, status, bytes = body.len(), "received response");

        Ok(ProbeResponse { status, body })
    }

    /// Like [`AuthenticatedClient::get`] but non-2xx responses become `ProbeError::Http`.
    pub fn get_ok(&self, path: &str, params: &[(&str, &str)], subject: i64) -> Result<ProbeResponse, ProbeError> {
        let resp = self.get(path, params, subject)?;
        if !resp.is_success() {
            return Err(ProbeError::Http {
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(resp)
    }

    /// Fetch `/invoices` and decode the JSON array body.
    pub fn list_invoices(&self, params: &[(&str, &str)], subject: i64) -> Result<Vec<InvoiceRecord>, ProbeError> {
        let resp = self.get_ok(INVOICES_PATH, params, subject)?;
        parse_invoice_list(&resp.body)
    }
}

pub fn parse_invoice_list(body: &str) -> Result<Vec<InvoiceRecord>, ProbeError> {
    let malformed = |reason: String| ProbeError::MalformedBody {
        reason,
        body: excerpt(body, 512),
    };

    let json: Value = serde_json::from_str(body).map_err(|e| malformed(format!("invalid JSON ({})", e)))?;
    if !json.is_array() {
        return Err(malformed("expected a JSON array".to_string()));
    }
    serde_json::from_value(json).map_err(|e| malformed(format!("invalid invoice record ({})", e)))
}
