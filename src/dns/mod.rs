//! DNS queries and record handling.
//!
//! This module provides the protocol layer of the engine:
//! - The query primitive: raw UDP/TCP queries with explicit RD and EDNS
//!   settings against a chosen server (`query`)
//! - Zone transfer attempts (`zone_transfer`)
//! - Resolver lookups with TTL extraction (`lookup_records`, `reverse_lookup`)
//! - SPF/DMARC extraction and scoring from TXT records
//!
//! Everything above this module talks to the network through the
//! `network::Network` trait rather than calling these functions directly.

mod extract;
mod query;
mod records;
mod wire;

// Re-export public API
pub use extract::{
    extract_dmarc_record, extract_spf_records, parse_dmarc_tags, spf_lookup_count, spf_policy,
    SpfPolicy,
};
pub use query::{
    build_query, query, query_message, query_with_tcp_fallback, rcode_name, transfer_allowed,
    zone_transfer, ProbeRecord, ProbeResponse, QueryOptions, Transport,
};
pub use records::{lookup_records, reverse_lookup, Answer, RecordData, SoaData};
pub use wire::{exchange_tcp, exchange_udp, read_tcp_bytes, send_tcp_bytes};
