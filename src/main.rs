//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `dns_health` library that handles:
//! - Command-line argument parsing and domain validation
//! - Logger initialization
//! - The overall run timeout
//! - Report rendering (text or JSON, stdout or file) and exit codes
//!
//! All core functionality is implemented in the library crate.

use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use dns_health::initialization::init_logger_with;
use dns_health::{
    evaluate_exit_code, format_report, run_diagnostics_with, validate_domain, Config,
    LiveNetwork, Opt, OutputFormat,
};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let domain = match validate_domain(&opt.domain) {
        Ok(domain) => domain,
        Err(e) => {
            eprintln!("dns_health error: {e}");
            process::exit(1);
        }
    };

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = Config::from(&opt);
    let network = LiveNetwork::new(&config);

    let overall = Duration::from_secs(opt.timeout_seconds);
    let report = match tokio::time::timeout(
        overall,
        run_diagnostics_with(&network, &domain, &config),
    )
    .await
    {
        Ok(report) => report,
        Err(_) => {
            eprintln!(
                "dns_health: diagnostics for {domain} incomplete after {}s",
                overall.as_secs()
            );
            process::exit(3);
        }
    };

    let rendered = match opt.format {
        OutputFormat::Text => format_report(&report),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        }
    };

    match &opt.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    process::exit(evaluate_exit_code(opt.fail_on, &report.summary()));
}
