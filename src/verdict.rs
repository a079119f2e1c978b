// Verdict engine for invoice-probe
// Decides whether a probe's result sets show signs of SQL injection

use std::fmt;

use crate::models::{Field, InvoiceRecord, ProbeResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// Injected request returned a different number of rows than the baseline
    RowCountChanged { baseline: usize, injected: usize },
    /// Injected request returned rows owned by other subjects
    CrossTenantLeak { subject: i64, foreign_owners: Vec<i64> },
    /// A literal that can match nothing returned rows
    LiteralMatchedRows { rows: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub field: Field,
    pub kind: FindingKind,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FindingKind::RowCountChanged { baseline, injected } => write!(
                f,
                "possible SQL injection in `{}`: injected payload changed the result size ({} rows, baseline {})",
                self.field, injected, baseline
            ),
            FindingKind::CrossTenantLeak { subject, foreign_owners } => write!(
                f,
                "possible SQL injection in `{}`: response exposed invoices of other users {:?} to subject {}",
                self.field, foreign_owners, subject
            ),
            FindingKind::LiteralMatchedRows { rows } => write!(
                f,
                "possible SQL injection in `{}`: value was not bound as a literal parameter ({} rows matched a tautology)",
                self.field, rows
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Secure,
    Vulnerable(Finding),
}

impl Verdict {
    pub fn is_secure(&self) -> bool {
        matches!(self, Verdict::Secure)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Secure => write!(f, "no injection detected"),
            Verdict::Vulnerable(finding) => write!(f, "{}", finding),
        }
    }
}

/// Owners other than `subject` present in `records`, sorted and deduplicated.
pub fn foreign_owners(records: &[InvoiceRecord], subject: i64) -> Vec<i64> {
    let mut owners: Vec<i64> = records
        .iter()
        .map(|r| r.user_id)
        .filter(|owner| *owner != subject)
        .collect();
    owners.sort_unstable();
    owners.dedup();
    owners
}

/// Judge an operator-field probe.
///
/// A backend that enforces its operator allow-list ignores the payload and
/// answers exactly like the baseline. Cross-tenant rows are the critical
/// signature and are reported ahead of a size mismatch.
pub fn judge_operator_injection(result: &ProbeResult, subject: i64) -> Verdict {
    let leaked = foreign_owners(&result.injected, subject);
    if !leaked.is_empty() {
        return Verdict::Vulnerable(Finding {
            field: Field::Operator,
            kind: FindingKind::CrossTenantLeak {
                subject,
                foreign_owners: leaked,
            },
        });
    }

    if result.injected.len() != result.baseline.len() {
        return Verdict::Vulnerable(Finding {
            field: Field::Operator,
            kind: FindingKind::RowCountChanged {
                baseline: result.baseline.len(),
                injected: result.injected.len(),
            },
        });
    }

    Verdict::Secure
}

/// Judge a status-field probe: a bound literal matches no invoice at all.
pub fn judge_status_injection(records: &[InvoiceRecord]) -> Verdict {
    if records.is_empty() {
        Verdict::Secure
    } else {
        Verdict::Vulnerable(Finding {
            field: Field::Status,
            kind: FindingKind::LiteralMatchedRows { rows: records.len() },
        })
    }
}
