//! The engine's boundary to the outside world.
//!
//! Every check reaches DNS servers and mail exchangers through the `Network`
//! trait. `LiveNetwork` implements it over real sockets; tests implement it
//! in memory to script nameserver behavior.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;

use crate::config::{Config, DNS_PORT, SMTP_PORT};
use crate::dns::{self, Answer, ProbeResponse, QueryOptions, Transport};
use crate::error_handling::{LookupError, ProbeError};
use crate::initialization::{init_resolver, init_resolver_for};
use crate::tls::{self, SmtpProbe};

/// Outbound operations used by the checks.
pub trait Network: Send + Sync {
    /// Looks up `name` through the recursive resolver.
    fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> impl Future<Output = Result<Answer, LookupError>> + Send;

    /// Looks up `name` by asking only the given nameserver IPs.
    fn lookup_at(
        &self,
        servers: &[IpAddr],
        name: &str,
        record_type: RecordType,
    ) -> impl Future<Output = Result<Answer, LookupError>> + Send;

    /// Reverse (PTR) lookup through the recursive resolver.
    fn reverse_lookup(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = Result<Vec<String>, LookupError>> + Send;

    /// Sends one raw query to `server` on port 53.
    fn probe(
        &self,
        server: IpAddr,
        name: &str,
        record_type: RecordType,
        options: QueryOptions,
    ) -> impl Future<Output = Result<ProbeResponse, ProbeError>> + Send;

    /// Like `probe`, but a truncated UDP response is repeated once over TCP.
    fn probe_with_tcp_fallback(
        &self,
        server: IpAddr,
        name: &str,
        record_type: RecordType,
        options: QueryOptions,
    ) -> impl Future<Output = Result<ProbeResponse, ProbeError>> + Send {
        async move {
            let response = self.probe(server, name, record_type, options).await?;
            if response.truncated && options.transport == Transport::Udp {
                log::debug!("Truncated response from {server}, retrying over TCP");
                return self
                    .probe(server, name, record_type, options.over(Transport::Tcp))
                    .await;
            }
            Ok(response)
        }
    }

    /// Attempts an AXFR of `zone` from `server`; `Ok(true)` means the
    /// transfer was allowed.
    fn zone_transfer(
        &self,
        server: IpAddr,
        zone: &str,
    ) -> impl Future<Output = Result<bool, ProbeError>> + Send;

    /// Runs the SMTP STARTTLS dialogue against `ip` on port 25.
    fn smtp_starttls(
        &self,
        host: &str,
        ip: IpAddr,
    ) -> impl Future<Output = Result<SmtpProbe, ProbeError>> + Send;
}

/// `Network` over real sockets and the system resolver.
#[derive(Clone)]
pub struct LiveNetwork {
    resolver: Arc<TokioAsyncResolver>,
    resolver_timeout: Duration,
    tcp_timeout: Duration,
    smtp_timeout: Duration,
    helo_name: String,
}

impl LiveNetwork {
    /// Creates the live backend, initializing the system resolver.
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: init_resolver(config.resolver_timeout()),
            resolver_timeout: config.resolver_timeout(),
            tcp_timeout: config.tcp_timeout(),
            smtp_timeout: config.smtp_timeout(),
            helo_name: config.helo_name.clone(),
        }
    }
}

impl Network for LiveNetwork {
    async fn lookup(&self, name: &str, record_type: RecordType) -> Result<Answer, LookupError> {
        dns::lookup_records(&self.resolver, name, record_type).await
    }

    async fn lookup_at(
        &self,
        servers: &[IpAddr],
        name: &str,
        record_type: RecordType,
    ) -> Result<Answer, LookupError> {
        if servers.is_empty() {
            return Err(LookupError::Failed("no nameserver addresses".to_string()));
        }
        let resolver = init_resolver_for(servers, self.resolver_timeout);
        dns::lookup_records(&resolver, name, record_type).await
    }

    async fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>, LookupError> {
        dns::reverse_lookup(&self.resolver, ip).await
    }

    async fn probe(
        &self,
        server: IpAddr,
        name: &str,
        record_type: RecordType,
        options: QueryOptions,
    ) -> Result<ProbeResponse, ProbeError> {
        dns::query(SocketAddr::new(server, DNS_PORT), name, record_type, &options).await
    }

    async fn probe_with_tcp_fallback(
        &self,
        server: IpAddr,
        name: &str,
        record_type: RecordType,
        options: QueryOptions,
    ) -> Result<ProbeResponse, ProbeError> {
        dns::query_with_tcp_fallback(SocketAddr::new(server, DNS_PORT), name, record_type, &options)
            .await
    }

    async fn zone_transfer(&self, server: IpAddr, zone: &str) -> Result<bool, ProbeError> {
        dns::zone_transfer(SocketAddr::new(server, DNS_PORT), zone, self.tcp_timeout).await
    }

    async fn smtp_starttls(&self, host: &str, ip: IpAddr) -> Result<SmtpProbe, ProbeError> {
        tls::probe_starttls(
            SocketAddr::new(ip, SMTP_PORT),
            host,
            &self.helo_name,
            self.smtp_timeout,
        )
        .await
    }
}
