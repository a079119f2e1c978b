// Response analysis for invoice-probe
// Heuristics for database errors leaking through failed responses

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SQL_ERROR_SIGNATURES: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)syntax error at or near").unwrap(), "PostgreSQL syntax error"),
        (Regex::new(r"(?i)unterminated quoted string").unwrap(), "PostgreSQL unterminated string literal"),
        (Regex::new(r"(?i)you have an error in your sql syntax").unwrap(), "MySQL syntax error"),
        (Regex::new(r"(?i)SQLITE_ERROR|sqlite3?\.OperationalError").unwrap(), "SQLite error"),
        (Regex::new(r"(?i)unrecognized token").unwrap(), "SQLite tokenizer error"),
        (Regex::new(r"(?i)ORA-\d{5}").unwrap(), "Oracle error"),
        (Regex::new(r"(?i)unclosed quotation mark").unwrap(), "SQL Server unclosed quotation"),
        (Regex::new(r"(?i)\bsql\b.*\berror\b|\berror\b.*\bsql\b").unwrap(), "generic SQL error"),
    ];
}

/// Look for a database error signature in a response body.
///
/// Returns a short label for the first matching signature. A match on a
/// failed probe request means the payload reached the query parser.
pub fn detect_sql_error(body: &str) -> Option<String> {
    SQL_ERROR_SIGNATURES
        .iter()
        .find(|(re, _)| re.is_match(body))
        .map(|(_, label)| format!("response leaks a database error ({})", label))
}

/// Trim a response body for inclusion in diagnostics.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_postgres_syntax_error() {
        let body = r#"{"message":"syntax error at or near \"OR\""}"#;
        let hint = detect_sql_error(body).unwrap();
        assert!(hint.contains("PostgreSQL"));
    }

    #[test]
    fn detects_sqlite_error() {
        assert!(detect_sql_error("SQLITE_ERROR: near \"1\": syntax error").is_some());
    }

    #[test]
    fn ignores_plain_errors() {
        assert_eq!(detect_sql_error(r#"{"message":"Invalid token"}"#), None);
        assert_eq!(detect_sql_error(""), None);
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        assert_eq!(excerpt("abcdef", 3), "abc...");
        assert_eq!(excerpt("abc", 3), "abc");
    }
}
