//! Decoded record data and resolver lookups.
//!
//! `RecordData` is the crate's own view of resource record data, decoupled
//! from `hickory-proto` so that checks and test fixtures can build answers
//! without wire types. The lookup functions wrap a `TokioAsyncResolver` and
//! keep the TTL of the first matching record.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;

use crate::domain::{fqdn, normalize_name};
use crate::error_handling::LookupError;

/// Start of Authority values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoaData {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: u32,
}

/// Decoded record data for the record types the checks care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(String),
    Cname(String),
    Ptr(String),
    Mx { preference: u16, exchange: String },
    Soa(SoaData),
    /// TXT character-strings concatenated without separators
    Txt(String),
    /// CAA in presentation format
    Caa(String),
    Other(String),
}

impl RecordData {
    /// Converts wire record data. Names are normalized (lowercase, no
    /// trailing dot).
    pub fn from_rdata(rdata: &RData) -> Self {
        match rdata {
            RData::A(a) => RecordData::A(a.0),
            RData::AAAA(aaaa) => RecordData::Aaaa(aaaa.0),
            RData::NS(ns) => RecordData::Ns(normalize_name(&ns.0.to_utf8())),
            RData::CNAME(cname) => RecordData::Cname(normalize_name(&cname.0.to_utf8())),
            RData::PTR(ptr) => RecordData::Ptr(normalize_name(&ptr.0.to_utf8())),
            RData::MX(mx) => RecordData::Mx {
                preference: mx.preference(),
                exchange: normalize_name(&mx.exchange().to_utf8()),
            },
            RData::SOA(soa) => RecordData::Soa(SoaData {
                mname: normalize_name(&soa.mname().to_utf8()),
                rname: normalize_name(&soa.rname().to_utf8()),
                serial: soa.serial(),
                refresh: soa.refresh(),
                retry: soa.retry(),
                expire: soa.expire(),
                minimum: soa.minimum(),
            }),
            RData::TXT(txt) => RecordData::Txt(
                txt.iter()
                    .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                    .collect::<Vec<String>>()
                    .join(""),
            ),
            RData::CAA(_) => RecordData::Caa(rdata.to_string()),
            other => RecordData::Other(other.to_string()),
        }
    }

    /// The address carried by an A or AAAA record.
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            RecordData::A(ip) => Some(IpAddr::V4(*ip)),
            RecordData::Aaaa(ip) => Some(IpAddr::V6(*ip)),
            _ => None,
        }
    }

    /// The target name carried by an NS, CNAME, PTR or MX record.
    pub fn target(&self) -> Option<&str> {
        match self {
            RecordData::Ns(name) | RecordData::Cname(name) | RecordData::Ptr(name) => Some(name),
            RecordData::Mx { exchange, .. } => Some(exchange),
            _ => None,
        }
    }

    /// The record type this data belongs to.
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::AAAA,
            RecordData::Ns(_) => RecordType::NS,
            RecordData::Cname(_) => RecordType::CNAME,
            RecordData::Ptr(_) => RecordType::PTR,
            RecordData::Mx { .. } => RecordType::MX,
            RecordData::Soa(_) => RecordType::SOA,
            RecordData::Txt(_) => RecordType::TXT,
            RecordData::Caa(_) => RecordType::CAA,
            RecordData::Other(_) => RecordType::Unknown(0),
        }
    }
}

/// The records returned by a resolver for one name and type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answer {
    pub records: Vec<RecordData>,
    /// TTL of the first record, when the source reports one
    pub ttl: Option<u32>,
}

impl Answer {
    pub fn new(records: Vec<RecordData>, ttl: Option<u32>) -> Self {
        Self { records, ttl }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All A and AAAA addresses, in answer order.
    pub fn ips(&self) -> Vec<IpAddr> {
        self.records.iter().filter_map(RecordData::ip).collect()
    }

    /// All NS, CNAME, PTR or MX targets, in answer order.
    pub fn targets(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.target().map(str::to_string))
            .collect()
    }

    /// All TXT strings, in answer order.
    pub fn txt(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| match r {
                RecordData::Txt(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// The first SOA in the answer.
    pub fn soa(&self) -> Option<&SoaData> {
        self.records.iter().find_map(|r| match r {
            RecordData::Soa(soa) => Some(soa),
            _ => None,
        })
    }

    /// MX records as `(preference, exchange)`, sorted by preference.
    pub fn mx(&self) -> Vec<(u16, String)> {
        let mut mx: Vec<(u16, String)> = self
            .records
            .iter()
            .filter_map(|r| match r {
                RecordData::Mx {
                    preference,
                    exchange,
                } => Some((*preference, exchange.clone())),
                _ => None,
            })
            .collect();
        mx.sort();
        mx
    }

    /// Renders the TTL for messages ("300s" or "?").
    pub fn ttl_label(&self) -> String {
        self.ttl
            .map(|ttl| format!("{ttl}s"))
            .unwrap_or_else(|| "?".to_string())
    }
}

/// Queries `name` for `record_type` and decodes the matching records.
///
/// Records of other types picked up along the way (the CNAME chain of an A
/// lookup) are dropped. An empty result is reported as
/// `LookupError::NoAnswer`.
///
/// # Errors
///
/// Returns a `LookupError` distinguishing NXDOMAIN, empty answers and any
/// other resolver failure.
pub async fn lookup_records(
    resolver: &TokioAsyncResolver,
    name: &str,
    record_type: RecordType,
) -> Result<Answer, LookupError> {
    match resolver.lookup(fqdn(name), record_type).await {
        Ok(lookup) => {
            let mut ttl = None;
            let mut records = Vec::new();
            for record in lookup.record_iter() {
                if record.record_type() != record_type {
                    continue;
                }
                if let Some(rdata) = record.data() {
                    ttl.get_or_insert(record.ttl());
                    records.push(RecordData::from_rdata(rdata));
                }
            }
            if records.is_empty() {
                Err(LookupError::NoAnswer)
            } else {
                Ok(Answer::new(records, ttl))
            }
        }
        Err(e) => {
            let error = LookupError::from(e);
            if let LookupError::Failed(reason) = &error {
                log::warn!("{record_type} lookup failed for {name}: {reason}");
            } else {
                log::debug!("{record_type} lookup for {name}: {error}");
            }
            Err(error)
        }
    }
}

/// Performs a reverse (PTR) lookup for an IP address.
///
/// # Errors
///
/// Returns a `LookupError` if the address has no PTR or the lookup fails.
pub async fn reverse_lookup(
    resolver: &TokioAsyncResolver,
    ip: IpAddr,
) -> Result<Vec<String>, LookupError> {
    match resolver.reverse_lookup(ip).await {
        Ok(lookup) => {
            let names: Vec<String> = lookup
                .iter()
                .map(|ptr| normalize_name(&ptr.0.to_utf8()))
                .collect();
            if names.is_empty() {
                Err(LookupError::NoAnswer)
            } else {
                Ok(names)
            }
        }
        Err(e) => {
            let error = LookupError::from(e);
            log::debug!("PTR lookup for {ip}: {error}");
            Err(error)
        }
    }
}
