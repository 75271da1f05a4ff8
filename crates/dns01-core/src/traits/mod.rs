//! Core traits for DNS-01 challenge handling
//!
//! - [`ZoneApi`]: Zone and RRSet operations of a DNS provider

pub mod zone_api;

pub use zone_api::{RRSet, RecordType, ResourceRecord, Zone, ZoneApi, ZoneFilter, ZoneSummary};
