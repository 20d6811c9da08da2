//! Error handling.
//!
//! This module provides the error types used by the engine:
//! - Initialization errors (logger setup)
//! - Probe errors (raw DNS, zone transfer, SMTP/TLS)
//! - Lookup errors (recursive resolver)
//! - Delegation errors (resolver unavailable at the first step)
//! - Domain validation errors (CLI input)
//!
//! Probe and lookup errors never abort a diagnostic run; each one is turned
//! into a single `error` or `warn` check result by the check that hit it.

mod types;

// Re-export public API
pub use types::{
    DelegationError, DomainError, InitializationError, LookupError, ProbeError, ProbeFailureKind,
};
