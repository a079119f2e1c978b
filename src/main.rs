// Main CLI entry point for invoice-probe
// Uses clap for argument parsing

use clap::{Arg, ArgAction, Command};
use invoice_probe::auth::DEFAULT_SUBJECT;
use invoice_probe::config::ProbeConfig;
use invoice_probe::engine::AuthenticatedClient;
use invoice_probe::probes::run_all;
use invoice_probe::reporting::{export_csv, export_markdown};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let matches = Command::new("invoice-probe")
        .version(clap::crate_version!())
        .about("Black-box SQL injection probes for the invoice listing endpoint")
        .after_help("ENVIRONMENT:\n  BACKEND_URL   Base URL of the backend under test (default: http://localhost:5000)\n  JWT_SECRET    Secret the backend verifies tokens with\n  RUST_LOG      Log filter (default: info)\n\nEXAMPLES:\n  invoice-probe\n  invoice-probe --base-url http://staging:5000 --subject 2 --sweep")
        .arg(Arg::new("base_url")
            .short('b')
            .long("base-url")
            .num_args(1)
            .help("Base URL of the backend (overrides BACKEND_URL)"))
        .arg(Arg::new("subject")
            .short('s')
            .long("subject")
            .num_args(1)
            .value_parser(clap::value_parser!(i64))
            .help("User id the probe tokens are minted for (default: 1)"))
        .arg(Arg::new("sweep")
            .long("sweep")
            .action(ArgAction::SetTrue)
            .help("Run every payload variant instead of the canonical pair"))
        .arg(Arg::new("csv_report")
            .long("csv-report")
            .action(ArgAction::SetTrue)
            .help("Output CSV report (default: on)"))
        .arg(Arg::new("markdown_report")
            .long("markdown-report")
            .action(ArgAction::SetTrue)
            .help("Output Markdown report (default: on)"))
        .arg(Arg::new("no_report")
            .long("no-report")
            .action(ArgAction::SetTrue)
            .conflicts_with_all(["csv_report", "markdown_report"])
            .help("Do not write report files"))
        .get_matches();

    // .env is optional
    let _ = dotenvy::dotenv();
    init_logging();

    let mut config = ProbeConfig::from_env();
    if let Some(base_url) = matches.get_one::<String>("base_url") {
        config = config.with_base_url(base_url);
    }
    let subject = matches.get_one::<i64>("subject").copied().unwrap_or(DEFAULT_SUBJECT);
    let sweep = matches.get_flag("sweep");
    let no_report = matches.get_flag("no_report");
    let csv_report = !no_report && (matches.get_flag("csv_report") || !matches.get_flag("markdown_report"));
    let markdown_report = !no_report && (matches.get_flag("markdown_report") || !matches.get_flag("csv_report"));

    info!(?config, subject, sweep, "starting probes");

    let client = AuthenticatedClient::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to build HTTP client: {}", e);
        std::process::exit(2);
    });

    match client.minter().is_available() {
        Ok(true) => {}
        Ok(false) => warn!("token signing unavailable in this build; probes will be skipped"),
        Err(e) => warn!("cannot mint token: {}", e),
    }

    let outcomes = run_all(&client, subject, sweep);
    for o in &outcomes {
        match o.outcome.detail() {
            Some(detail) => println!("[{}] {} {}={:?}: {}", o.outcome.label(), o.probe, o.field, o.payload, detail),
            None => println!("[{}] {} {}={:?}", o.outcome.label(), o.probe, o.field, o.payload),
        }
    }

    let report_dir = Path::new(".");
    if csv_report {
        match export_csv(report_dir, &outcomes) {
            Ok(name) => println!("CSV report written to {}", name),
            Err(e) => eprintln!("Failed to write CSV report: {}", e),
        }
    }
    if markdown_report {
        match export_markdown(report_dir, &outcomes) {
            Ok(name) => println!("Markdown report written to {}", name),
            Err(e) => eprintln!("Failed to write Markdown report: {}", e),
        }
    }

    let failed = outcomes.iter().filter(|o| o.outcome.is_failure()).count();
    if failed > 0 {
        eprintln!("{} of {} probes failed", failed, outcomes.len());
        std::process::exit(1);
    }
}
