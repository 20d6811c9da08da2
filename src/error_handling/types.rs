//! Error type definitions.
//!
//! This module defines the error types used throughout the engine. Probe and
//! lookup errors are `Clone` so that a single failure can be reported against
//! several checks and replayed by test fixtures.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Failure of a single raw probe (DNS query, zone transfer, SMTP dialogue).
///
/// Every variant collapses to one "probe failed" outcome for the check that
/// issued the probe; the variant only feeds the message and evidence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The operation did not complete within its timeout.
    #[error("timed out after {0}ms")]
    Timeout(u128),

    /// Socket-level failure (connection refused, reset, unreachable).
    #[error("I/O error: {0}")]
    Io(String),

    /// The peer answered with something that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// TLS setup or handshake failure.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl From<std::io::Error> for ProbeError {
    fn from(e: std::io::Error) -> Self {
        ProbeError::Io(e.to_string())
    }
}

impl From<hickory_resolver::proto::error::ProtoError> for ProbeError {
    fn from(e: hickory_resolver::proto::error::ProtoError) -> Self {
        ProbeError::Malformed(e.to_string())
    }
}

/// Failure of a lookup through a recursive resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The name does not exist.
    #[error("NXDOMAIN")]
    NxDomain,

    /// The name exists but holds no records of the requested type.
    #[error("no records found")]
    NoAnswer,

    /// Timeout, SERVFAIL or any other resolver failure.
    #[error("{0}")]
    Failed(String),
}

impl LookupError {
    /// Returns true when the resolver answered authoritatively that there is
    /// no data (NXDOMAIN or an empty answer).
    pub fn is_no_data(&self) -> bool {
        matches!(self, LookupError::NxDomain | LookupError::NoAnswer)
    }
}

impl From<hickory_resolver::error::ResolveError> for LookupError {
    fn from(e: hickory_resolver::error::ResolveError) -> Self {
        use hickory_resolver::error::ResolveErrorKind;
        use hickory_resolver::proto::op::ResponseCode;

        match e.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. }
                if *response_code == ResponseCode::NXDomain =>
            {
                LookupError::NxDomain
            }
            ResolveErrorKind::NoRecordsFound { .. } => LookupError::NoAnswer,
            _ => LookupError::Failed(e.to_string()),
        }
    }
}

/// Failure that stops the delegation walk before it starts.
///
/// Only a resolver failure on the TLD's own NS set counts: without it the
/// resolver itself is unusable, and every later check would fail the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegationError {
    /// The resolver failed on the TLD's NS set.
    #[error("Cannot resolve nameservers for TLD .{tld}: {reason}")]
    ResolverUnavailable {
        /// Top-level label of the domain under test
        tld: String,
        /// Resolver failure text
        reason: String,
    },
}

/// Errors produced while validating a domain supplied on the command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Nothing left after trimming.
    #[error("domain is empty")]
    Empty,

    /// The input looks like a URL rather than a hostname.
    #[error("expected a bare hostname, got a URL: {0}")]
    NotAHostname(String),

    /// The input contains characters that cannot appear in a hostname.
    #[error("invalid character in domain: {0:?}")]
    InvalidCharacter(char),

    /// A label is empty or longer than 63 octets.
    #[error("invalid label in domain: {0:?}")]
    InvalidLabel(String),
}

/// Coarse classification of probe failures, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ProbeFailureKind {
    Timeout,
    Network,
    Protocol,
    Tls,
}

impl ProbeFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeFailureKind::Timeout => "probe timeout",
            ProbeFailureKind::Network => "network error",
            ProbeFailureKind::Protocol => "protocol error",
            ProbeFailureKind::Tls => "TLS error",
        }
    }
}

impl std::fmt::Display for ProbeFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProbeError {
    /// Returns the coarse failure class of this error.
    pub fn kind(&self) -> ProbeFailureKind {
        match self {
            ProbeError::Timeout(_) => ProbeFailureKind::Timeout,
            ProbeError::Io(_) => ProbeFailureKind::Network,
            ProbeError::Malformed(_) => ProbeFailureKind::Protocol,
            ProbeError::Tls(_) => ProbeFailureKind::Tls,
        }
    }
}
