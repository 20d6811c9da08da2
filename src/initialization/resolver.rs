//! DNS resolver initialization.
//!
//! This module provides functions to initialize the recursive resolver used
//! for ordinary lookups, and resolvers bound to specific nameserver IPs for
//! the per-nameserver checks.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

use crate::config::DNS_PORT;

fn resolver_opts(timeout: Duration, attempts: usize) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = attempts;
    // Set ndots to 0 to prevent search domain appending
    opts.ndots = 0;
    opts
}

/// Initializes the recursive resolver for ordinary lookups.
///
/// Uses the system resolver configuration (`/etc/resolv.conf` or the
/// platform equivalent). When that cannot be read, falls back to the
/// built-in public configuration so that a diagnostic run can still start.
///
/// # Arguments
///
/// * `timeout` - Per-attempt query timeout
///
/// # Returns
///
/// A configured `TokioAsyncResolver` wrapped in `Arc` for sharing across tasks.
pub fn init_resolver(timeout: Duration) -> Arc<TokioAsyncResolver> {
    let config = match hickory_resolver::system_conf::read_system_conf() {
        Ok((config, _)) => config,
        Err(e) => {
            log::warn!("Failed to read system resolver configuration, using defaults: {e}");
            ResolverConfig::default()
        }
    };
    Arc::new(TokioAsyncResolver::tokio(config, resolver_opts(timeout, 2)))
}

/// Initializes a resolver that sends every query to the given nameserver
/// IPs on port 53 and nowhere else.
///
/// Each call builds a fresh resolver with its own empty cache, so answers
/// reflect what those servers return right now.
pub fn init_resolver_for(ips: &[IpAddr], timeout: Duration) -> TokioAsyncResolver {
    let group = NameServerConfigGroup::from_ips_clear(ips, DNS_PORT, true);
    let config = ResolverConfig::from_parts(None, vec![], group);
    TokioAsyncResolver::tokio(config, resolver_opts(timeout, 1))
}
