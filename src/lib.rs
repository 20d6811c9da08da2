//! dns_health library: DNS health diagnostics for a single domain
//!
//! This library inspects a domain's delegation, probes each of its
//! nameservers directly, checks zone and record consistency, and audits the
//! mail setup (MX, STARTTLS, SPF, DMARC). Every finding becomes a
//! `CheckResult` in a `Report`, annotated with what was tested, why it
//! matters and how to fix it.
//!
//! # Example
//!
//! ```no_run
//! use dns_health::{format_report, run_diagnostics_with, Config, LiveNetwork};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = Config {
//!     check_smtp: false,
//!     ..Default::default()
//! };
//! let network = LiveNetwork::new(&config);
//!
//! let report = run_diagnostics_with(&network, "example.com", &config).await;
//! let summary = report.summary();
//! println!("{} passed, {} warnings, {} errors",
//!          summary.passed, summary.warnings, summary.errors);
//! println!("{}", format_report(&report));
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod checks;
pub mod config;
mod dns;
mod domain;
mod error_handling;
pub mod initialization;
mod network;
mod report;
mod run;
mod tls;

// Re-export public API
pub use config::{Config, FailOn, LogFormat, LogLevel, Opt, OutputFormat};
pub use dns::{Answer, ProbeRecord, ProbeResponse, QueryOptions, RecordData, SoaData, Transport};
pub use domain::{normalize_name, validate_domain};
pub use error_handling::{
    DelegationError, DomainError, InitializationError, LookupError, ProbeError, ProbeFailureKind,
};
pub use network::{LiveNetwork, Network};
pub use report::{format_report, lookup_doc, CheckResult, CheckStatus, DocEntry, Report, Summary};
pub use run::{evaluate_exit_code, run_diagnostics, run_diagnostics_with};
pub use tls::SmtpProbe;
