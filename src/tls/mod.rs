//! SMTP STARTTLS probing.
//!
//! This module connects to a mail exchanger on port 25 and walks the SMTP
//! dialogue up to a TLS handshake:
//! - Banner and EHLO capability list
//! - STARTTLS command and its `220` reply
//! - TLS handshake over the same socket, validated against the MX hostname
//! - Certificate common name and negotiated TLS version
//!
//! Uses `tokio-rustls` for the handshake and `x509-parser` for certificate
//! parsing.

mod extract;
mod smtp;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::error_handling::ProbeError;

use extract::{extract_common_name, extract_dns_sans};
pub use smtp::{read_reply, send_command, SmtpReply};

/// Outcome of an SMTP probe that got as far as the EHLO reply.
///
/// Failures before that point (connect, banner, EHLO) are returned as
/// `ProbeError` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpProbe {
    /// TLS handshake completed.
    Established {
        banner: String,
        common_name: Option<String>,
        tls_version: String,
    },
    /// EHLO reply does not list STARTTLS.
    NotAdvertised { banner: String },
    /// STARTTLS was advertised but the command was not answered with `220`.
    Rejected { banner: String, reply: String },
    /// STARTTLS was accepted but the TLS handshake failed.
    HandshakeFailed { banner: String, reason: String },
}

async fn within<T, F>(timeout: Duration, fut: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ProbeError::Timeout(timeout.as_millis()))?
}

/// Probes a mail exchanger for STARTTLS support.
///
/// # Arguments
///
/// * `addr` - Address of the mail exchanger (normally port 25)
/// * `host` - MX hostname, used as the TLS server name
/// * `helo` - Name sent with EHLO
/// * `step_timeout` - Timeout applied to each step of the dialogue
///
/// # Errors
///
/// Returns a `ProbeError` if the connection, banner or EHLO exchange fails.
pub async fn probe_starttls(
    addr: SocketAddr,
    host: &str,
    helo: &str,
    step_timeout: Duration,
) -> Result<SmtpProbe, ProbeError> {
    log::debug!("Probing STARTTLS on {host} ({addr})");

    let stream = within(step_timeout, async { Ok(TcpStream::connect(addr).await?) }).await?;
    let mut reader = BufReader::new(stream);

    let greeting = within(step_timeout, read_reply(&mut reader)).await?;
    if greeting.code != 220 {
        return Err(ProbeError::Malformed(format!(
            "unexpected SMTP greeting: {}",
            greeting.text()
        )));
    }
    let banner = greeting.text();

    send_command(reader.get_mut(), &format!("EHLO {helo}")).await?;
    let ehlo = within(step_timeout, read_reply(&mut reader)).await?;
    if ehlo.code != 250 {
        return Err(ProbeError::Malformed(format!(
            "EHLO rejected: {}",
            ehlo.text()
        )));
    }
    if !ehlo.advertises("STARTTLS") {
        return Ok(SmtpProbe::NotAdvertised { banner });
    }

    send_command(reader.get_mut(), "STARTTLS").await?;
    match within(step_timeout, read_reply(&mut reader)).await {
        Ok(reply) if reply.code == 220 => {}
        Ok(reply) => {
            return Ok(SmtpProbe::Rejected {
                banner,
                reply: reply.text(),
            })
        }
        Err(e) => {
            return Ok(SmtpProbe::Rejected {
                banner,
                reply: e.to_string(),
            })
        }
    }

    match tls_handshake(reader.into_inner(), host, step_timeout).await {
        Ok((common_name, tls_version)) => Ok(SmtpProbe::Established {
            banner,
            common_name,
            tls_version,
        }),
        Err(e) => {
            log::debug!("TLS handshake with {host} failed: {e}");
            Ok(SmtpProbe::HandshakeFailed {
                banner,
                reason: e.to_string(),
            })
        }
    }
}

fn client_config() -> Result<ClientConfig, ProbeError> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| ProbeError::Tls(e.to_string()))?
    .with_root_certificates(root_store)
    .with_no_client_auth();
    Ok(config)
}

/// Runs the TLS handshake over an SMTP connection that accepted STARTTLS.
///
/// Returns the certificate common name (falling back to the first DNS SAN)
/// and the negotiated protocol version.
async fn tls_handshake(
    stream: TcpStream,
    host: &str,
    timeout: Duration,
) -> Result<(Option<String>, String), ProbeError> {
    let config = client_config()?;
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| ProbeError::Tls(format!("invalid server name {host}: {e}")))?;

    let connector = TlsConnector::from(Arc::new(config));
    let tls_stream = within(timeout, async {
        connector
            .connect(server_name, stream)
            .await
            .map_err(|e| ProbeError::Tls(e.to_string()))
    })
    .await?;

    let (_, connection) = tls_stream.get_ref();
    let tls_version = connection
        .protocol_version()
        .map(|v| format!("{v:?}"))
        .unwrap_or_else(|| "Unknown".to_string());

    let common_name = connection
        .peer_certificates()
        .and_then(|certs| certs.first())
        .and_then(|cert| match extract_common_name(cert.as_ref()) {
            Ok(Some(cn)) => Some(cn),
            Ok(None) => extract_dns_sans(cert.as_ref())
                .ok()
                .and_then(|sans| sans.into_iter().next()),
            Err(e) => {
                log::debug!("Failed to parse certificate from {host}: {e}");
                None
            }
        });

    Ok((common_name, tls_version))
}
