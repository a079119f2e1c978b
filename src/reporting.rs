// Reporting and output for invoice-probe
// Supports CSV and Markdown export of probe outcomes

use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::probes::ProbeOutcome;

/// Escape CSV field to prevent formula injection attacks
/// Cells starting with =, +, -, @, or tab are prefixed with single quote
pub fn escape_csv_field(field: &str) -> String {
    let Some(first_char) = field.chars().next() else {
        return String::new();
    };
    let needs_escaping = matches!(first_char, '=' | '+' | '-' | '@' | '\t');

    if needs_escaping {
        // Prefix with single quote to prevent formula injection
        format!("\"'{}\"", field.replace('"', "\"\""))
    } else if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn report_filename(dir: &Path, extension: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("invoice_probe_report_{}.{}", timestamp, extension))
        .to_string_lossy()
        .into_owned()
}

pub fn export_csv(dir: &Path, outcomes: &[ProbeOutcome]) -> Result<String, std::io::Error> {
    let filename = report_filename(dir, "csv");
    let mut file = File::create(&filename)?;

    writeln!(file, "Probe,Field,Payload,Result")?;
    for o in outcomes {
        writeln!(
            file,
            "{},{},{},{}",
            escape_csv_field(&o.probe.to_string()),
            escape_csv_field(o.field.as_param()),
            escape_csv_field(&o.payload),
            escape_csv_field(&o.outcome.to_string())
        )?;
    }

    Ok(filename)
}

/// Wrap `text` in a code span whose fence is longer than any backtick run inside it.
pub fn markdown_code_span(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    let fence = "`".repeat(longest + 1);
    let text = single_line(text);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{} {} {}", fence, text, fence)
    } else {
        format!("{}{}{}", fence, text, fence)
    }
}

// Keeps each outcome on its own list item.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

pub fn export_markdown(dir: &Path, outcomes: &[ProbeOutcome]) -> Result<String, std::io::Error> {
    let filename = report_filename(dir, "md");
    let mut file = File::create(&filename)?;

    writeln!(file, "# Invoice Probe Report\n")?;
    for o in outcomes {
        writeln!(
            file,
            "- **{}** `{}` = {}: {}",
            o.probe,
            o.field,
            markdown_code_span(&o.payload),
            single_line(&o.outcome.to_string())
        )?;
    }

    let failed = outcomes.iter().filter(|o| o.outcome.is_failure()).count();
    writeln!(file, "\n{} of {} probes failed.", failed, outcomes.len())?;

    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_formula_prefixes() {
        assert_eq!(escape_csv_field("= 'paid' OR 1=1 --"), "\"'= 'paid' OR 1=1 --\"");
        assert_eq!(escape_csv_field("@SUM(1)"), "\"'@SUM(1)\"");
    }

    #[test]
    fn quotes_commas_and_quotes() {
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("paid\" OR \"1\"=\"1"), "\"paid\"\" OR \"\"1\"\"=\"\"1\"");
    }

    #[test]
    fn code_span_outgrows_inner_backticks() {
        assert_eq!(markdown_code_span("OR 1=1 --"), "`OR 1=1 --`");
        assert_eq!(markdown_code_span("a`b"), "``a`b``");
        assert_eq!(markdown_code_span("x``y"), "```x``y```");
        assert_eq!(markdown_code_span("`tick"), "`` `tick ``");
    }

    #[test]
    fn code_span_stays_on_one_line() {
        assert_eq!(markdown_code_span("a\nb"), "`a b`");
        assert_eq!(single_line("line1\r\nline2"), "line1 line2");
    }

    #[test]
    fn plain_fields_untouched() {
        assert_eq!(escape_csv_field("SECURE"), "SECURE");
        assert_eq!(escape_csv_field(""), "");
        assert_eq!(escape_csv_field("paid' OR '1'='1"), "paid' OR '1'='1");
    }
}
