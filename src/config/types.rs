//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_HELO_NAME, DNS_TIMEOUT_SECS, EDNS_PAYLOAD_SIZE, OVERALL_TIMEOUT,
    RESOLVER_TIMEOUT_SECS, SMTP_TIMEOUT_SECS, TCP_QUERY_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The sectioned text report
    Text,
    /// The report serialized as pretty-printed JSON
    Json,
}

/// Exit code policy for the CLI.
///
/// Decides whether a completed report should turn into a non-zero exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Always exit 0 once the report is produced
    Never,
    /// Exit 2 when any check has `error` status
    Errors,
    /// Exit 2 when any check has `error` or `warn` status
    Warnings,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use dns_health::Config;
///
/// let config = Config {
///     check_smtp: false,
///     dns_timeout_seconds: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout for single UDP probes against a nameserver
    pub dns_timeout_seconds: u64,

    /// Timeout for TCP probes and zone transfer attempts
    pub tcp_timeout_seconds: u64,

    /// Per-attempt timeout for recursive resolver lookups
    pub resolver_timeout_seconds: u64,

    /// Per-step timeout for the SMTP/STARTTLS dialogue
    pub smtp_timeout_seconds: u64,

    /// EDNS UDP payload size advertised by the EDNS probe
    pub edns_payload: u16,

    /// Name sent in the SMTP EHLO command
    pub helo_name: String,

    /// Probe MX hosts on port 25 for STARTTLS
    pub check_smtp: bool,

    /// Query DNS blocklists for the domain's first A record
    pub check_blacklists: bool,
}

impl Config {
    /// Timeout for single UDP probes.
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_seconds)
    }

    /// Timeout for TCP probes.
    pub fn tcp_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_timeout_seconds)
    }

    /// Timeout for resolver lookups.
    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_secs(self.resolver_timeout_seconds)
    }

    /// Timeout for each SMTP step.
    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dns_timeout_seconds: DNS_TIMEOUT_SECS,
            tcp_timeout_seconds: TCP_QUERY_TIMEOUT_SECS,
            resolver_timeout_seconds: RESOLVER_TIMEOUT_SECS,
            smtp_timeout_seconds: SMTP_TIMEOUT_SECS,
            edns_payload: EDNS_PAYLOAD_SIZE,
            helo_name: DEFAULT_HELO_NAME.to_string(),
            check_smtp: true,
            check_blacklists: true,
        }
    }
}

/// Command-line options for the `dns_health` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dns_health",
    version,
    about = "Run DNS health diagnostics against a domain"
)]
pub struct Opt {
    /// Domain to diagnose (bare hostname, e.g. example.com)
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Overall timeout for the whole run in seconds
    #[arg(long, default_value_t = OVERALL_TIMEOUT.as_secs())]
    pub timeout_seconds: u64,

    /// Timeout for single UDP probes in seconds
    #[arg(long, default_value_t = DNS_TIMEOUT_SECS)]
    pub dns_timeout_seconds: u64,

    /// Skip the SMTP STARTTLS probes (port 25 is often blocked)
    #[arg(long)]
    pub skip_smtp: bool,

    /// Skip the DNS blocklist lookups
    #[arg(long)]
    pub skip_blacklists: bool,

    /// Name sent in the SMTP EHLO command
    #[arg(long, default_value = DEFAULT_HELO_NAME)]
    pub helo: String,

    /// Exit code policy
    #[arg(long, value_enum, default_value = "never")]
    pub fail_on: FailOn,
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        Self {
            dns_timeout_seconds: opt.dns_timeout_seconds,
            helo_name: opt.helo.clone(),
            check_smtp: !opt.skip_smtp,
            check_blacklists: !opt.skip_blacklists,
            ..Default::default()
        }
    }
}
