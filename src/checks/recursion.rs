//! Open-recursion detection.
//!
//! Many authoritative servers answer any query whether or not RD is set, so
//! a single RD=1 probe cannot tell recursion from an authoritative answer.
//! The test therefore sends a control probe with RD clear first, and only
//! then the RD=1 probe, each for a fresh random name that cannot be cached.

use std::net::IpAddr;

use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::RecordType;
use rand::Rng;

use crate::config::{
    Config, RECURSION_PROBE_LABEL_LEN, RECURSION_PROBE_PREFIX, RECURSION_PROBE_TLD,
};
use crate::dns::{ProbeResponse, QueryOptions};
use crate::error_handling::ProbeError;
use crate::network::Network;

const LABEL_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Outcome of the recursion test, with the reason that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecursionVerdict {
    Open(String),
    Closed(String),
}

impl RecursionVerdict {
    pub fn is_open(&self) -> bool {
        matches!(self, RecursionVerdict::Open(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            RecursionVerdict::Open(reason) | RecursionVerdict::Closed(reason) => reason,
        }
    }
}

/// A fresh name such as `recursion-test-k3j9....com.` that will not exist.
pub fn random_probe_name() -> String {
    let mut rng = rand::rng();
    let label: String = (0..RECURSION_PROBE_LABEL_LEN)
        .map(|_| LABEL_CHARS[rng.random_range(0..LABEL_CHARS.len())] as char)
        .collect();
    format!("{RECURSION_PROBE_PREFIX}{label}.{RECURSION_PROBE_TLD}")
}

fn is_noerror_or_nxdomain(code: ResponseCode) -> bool {
    matches!(code, ResponseCode::NoError | ResponseCode::NXDomain)
}

/// Decides from the RD=0 control probe whether the RD=1 probe is needed.
///
/// Returns `Some(verdict)` when the control probe already settles it.
pub fn classify_control(control: &Result<ProbeResponse, ProbeError>) -> Option<RecursionVerdict> {
    match control {
        Ok(response)
            if is_noerror_or_nxdomain(response.response_code) && !response.authoritative =>
        {
            Some(RecursionVerdict::Closed(format!(
                "control probe (RD=0) answered {} without AA",
                response.rcode_name()
            )))
        }
        Ok(_) => None,
        Err(ProbeError::Timeout(_)) => None,
        Err(e) => Some(RecursionVerdict::Closed(format!("control probe failed: {e}"))),
    }
}

/// Classifies the RD=1 probe.
pub fn classify_recursive(response: &ProbeResponse) -> RecursionVerdict {
    let rcode = response.rcode_name();
    if matches!(
        response.response_code,
        ResponseCode::Refused | ResponseCode::NotImp | ResponseCode::NotAuth
    ) {
        return RecursionVerdict::Closed(format!("RD=1 probe answered {rcode}"));
    }
    if !response.recursion_available {
        return RecursionVerdict::Closed("RA flag not set".to_string());
    }
    if response.authoritative {
        return RecursionVerdict::Closed("answered from own zone (AA=1)".to_string());
    }
    if !is_noerror_or_nxdomain(response.response_code) {
        return RecursionVerdict::Closed(format!("RD=1 probe answered {rcode}"));
    }
    if !response.has_answers() && !response.authority_has_soa() {
        return RecursionVerdict::Closed("no answer and no SOA in authority".to_string());
    }
    RecursionVerdict::Open(format!("RD=1 probe resolved a random name ({rcode}, RA=1, AA=0)"))
}

/// Runs the two-probe open-recursion test against one server.
pub async fn test_open_recursion<N: Network>(
    network: &N,
    server: IpAddr,
    config: &Config,
) -> RecursionVerdict {
    let options = QueryOptions::udp(config.dns_timeout());

    let control_name = random_probe_name();
    let control = network
        .probe_with_tcp_fallback(server, &control_name, RecordType::A, options.with_recursion(false))
        .await;
    if let Some(verdict) = classify_control(&control) {
        return verdict;
    }

    let probe_name = random_probe_name();
    match network
        .probe_with_tcp_fallback(server, &probe_name, RecordType::A, options.with_recursion(true))
        .await
    {
        Ok(response) => classify_recursive(&response),
        Err(e) => {
            log::debug!("RD=1 probe to {server} failed ({}): {e}", e.kind());
            RecursionVerdict::Closed(format!("RD=1 probe failed: {e}"))
        }
    }
}
