// SQL injection probes for the invoice listing
// Each probe fetches a baseline, sends the adversarial request, then evaluates a verdict

use std::fmt;

use tracing::{info, warn};

use crate::engine::{AuthenticatedClient, ProbeError};
use crate::models::{Field, InvoiceRecord, ProbeKind, ProbeResult};
use crate::payloads::{
    operator_payloads, status_payloads, BASELINE_STATUS, OPERATOR_TAUTOLOGY, SAFE_OPERATOR,
    STATUS_TAUTOLOGY,
};
use crate::verdict::{judge_operator_injection, judge_status_injection, Verdict};

/// Operator-field probe with the canonical `OR 1=1 --` payload.
pub fn run_operator_injection(client: &AuthenticatedClient, subject: i64) -> Result<(ProbeResult, Verdict), ProbeError> {
    let baseline = client.list_invoices(&[], subject)?;
    probe_operator(client, subject, &baseline, OPERATOR_TAUTOLOGY)
}

/// Status-field probe with the canonical `paid' OR '1'='1` payload.
pub fn run_status_injection(client: &AuthenticatedClient, subject: i64) -> Result<(Vec<InvoiceRecord>, Verdict), ProbeError> {
    probe_status(client, subject, STATUS_TAUTOLOGY)
}

fn probe_operator(
    client: &AuthenticatedClient,
    subject: i64,
    baseline: &[InvoiceRecord],
    payload: &str,
) -> Result<(ProbeResult, Verdict), ProbeError> {
    let injected = client.list_invoices(
        &[("status", BASELINE_STATUS), ("operator", payload)],
        subject,
    )?;

    let result = ProbeResult {
        baseline: baseline.to_vec(),
        injected,
    };
    let verdict = judge_operator_injection(&result, subject);
    log_verdict(ProbeKind::OperatorInjection, payload, &verdict);
    Ok((result, verdict))
}

fn probe_status(client: &AuthenticatedClient, subject: i64, payload: &str) -> Result<(Vec<InvoiceRecord>, Verdict), ProbeError> {
    let records = client.list_invoices(&[("status", payload), ("operator", SAFE_OPERATOR)], subject)?;
    let verdict = judge_status_injection(&records);
    log_verdict(ProbeKind::StatusInjection, payload, &verdict);
    Ok((records, verdict))
}

fn log_verdict(kind: ProbeKind, payload: &str, verdict: &Verdict) {
    match verdict {
        Verdict::Secure => info!(probe = %kind, payload, "probe passed"),
        Verdict::Vulnerable(finding) => warn!(probe = %kind, payload, "{}", finding),
    }
}

/// Final state of one probe run as reported by the runner
#[derive(Debug)]
pub enum Outcome {
    Secure,
    Vulnerable(String),
    /// Signing unavailable in this build
    Skipped(String),
    Failed(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Secure => "SECURE",
            Outcome::Vulnerable(_) => "VULNERABLE",
            Outcome::Skipped(_) => "SKIPPED",
            Outcome::Failed(_) => "FAILED",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Outcome::Secure => None,
            Outcome::Vulnerable(d) | Outcome::Skipped(d) | Outcome::Failed(d) => Some(d),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Vulnerable(_) | Outcome::Failed(_))
    }

    fn from_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Secure => Outcome::Secure,
            Verdict::Vulnerable(finding) => Outcome::Vulnerable(finding.to_string()),
        }
    }

    fn from_error(err: ProbeError) -> Self {
        if err.is_capability_unavailable() {
            Outcome::Skipped(err.to_string())
        } else {
            Outcome::Failed(err.to_string())
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.label(), detail),
            None => write!(f, "{}", self.label()),
        }
    }
}

#[derive(Debug)]
pub struct ProbeOutcome {
    pub probe: ProbeKind,
    pub field: Field,
    pub payload: String,
    pub outcome: Outcome,
}

impl ProbeOutcome {
    pub fn new(probe: ProbeKind, payload: &str, outcome: Outcome) -> Self {
        Self {
            probe,
            field: probe.field(),
            payload: payload.to_string(),
            outcome,
        }
    }
}

/// Run the operator probe for every payload in the catalogue against one baseline.
pub fn sweep_operator(client: &AuthenticatedClient, subject: i64) -> Vec<ProbeOutcome> {
    let payloads = operator_payloads();
    let baseline = match client.list_invoices(&[], subject) {
        Ok(records) => records,
        Err(err) => {
            // without a baseline every payload ends the same way
            let skipped = err.is_capability_unavailable();
            let detail = err.to_string();
            return payloads
                .iter()
                .map(|p| {
                    let outcome = if skipped {
                        Outcome::Skipped(detail.clone())
                    } else {
                        Outcome::Failed(format!("baseline fetch failed: {}", detail))
                    };
                    ProbeOutcome::new(ProbeKind::OperatorInjection, p, outcome)
                })
                .collect();
        }
    };

    payloads
        .iter()
        .map(|p| {
            let outcome = match probe_operator(client, subject, &baseline, p) {
                Ok((_, verdict)) => Outcome::from_verdict(verdict),
                Err(err) => Outcome::from_error(err),
            };
            ProbeOutcome::new(ProbeKind::OperatorInjection, p, outcome)
        })
        .collect()
}

/// Run the status probe for every literal-escape payload.
pub fn sweep_status(client: &AuthenticatedClient, subject: i64) -> Vec<ProbeOutcome> {
    status_payloads(BASELINE_STATUS)
        .iter()
        .map(|p| {
            let outcome = match probe_status(client, subject, p) {
                Ok((_, verdict)) => Outcome::from_verdict(verdict),
                Err(err) => Outcome::from_error(err),
            };
            ProbeOutcome::new(ProbeKind::StatusInjection, p, outcome)
        })
        .collect()
}

/// Run both canonical probes, or the full payload sweeps when `sweep` is set.
pub fn run_all(client: &AuthenticatedClient, subject: i64, sweep: bool) -> Vec<ProbeOutcome> {
    if sweep {
        let mut outcomes = sweep_operator(client, subject);
        outcomes.extend(sweep_status(client, subject));
        return outcomes;
    }

    let operator = match run_operator_injection(client, subject) {
        Ok((_, verdict)) => Outcome::from_verdict(verdict),
        Err(err) => Outcome::from_error(err),
    };
    let status = match run_status_injection(client, subject) {
        Ok((_, verdict)) => Outcome::from_verdict(verdict),
        Err(err) => Outcome::from_error(err),
    };

    vec![
        ProbeOutcome::new(ProbeKind::OperatorInjection, OPERATOR_TAUTOLOGY, operator),
        ProbeOutcome::new(ProbeKind::StatusInjection, STATUS_TAUTOLOGY, status),
    ]
}
