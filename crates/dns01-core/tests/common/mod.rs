//! Test doubles and common utilities for reconciler contract tests
//!
//! [`RecordingZoneApi`] is an in-memory provider that records every call so
//! tests can assert on the exact request sequence and payloads.

#![allow(dead_code)]

use async_trait::async_trait;
use dns01_core::error::{Error, Result};
use dns01_core::traits::{RRSet, RecordType, Zone, ZoneApi, ZoneFilter, ZoneSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListZones(ZoneFilter),
    GetZone(String),
    GetRRSet { zone: String, name: String },
    CreateRRSet { zone: String, name: String, body: RRSet },
    UpdateRRSet { zone: String, name: String, body: RRSet },
    DeleteRRSet { zone: String, name: String },
}

#[derive(Default)]
struct State {
    zones: Vec<String>,
    rrsets: HashMap<(String, String, RecordType), RRSet>,
    calls: Vec<Call>,
    fail_list_zones: bool,
    conflicting_reads: bool,
    vanish_before_delete: bool,
}

/// In-memory `ZoneApi` that records calls
///
/// Clones share state, so a test can keep one handle while the reconciler
/// owns another.
#[derive(Clone, Default)]
pub struct RecordingZoneApi {
    state: Arc<Mutex<State>>,
}

impl RecordingZoneApi {
    /// Create a provider managing the given zones
    pub fn with_zones(zones: &[&str]) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().zones = zones.iter().map(|z| z.to_string()).collect();
        api
    }

    /// Pre-populate a TXT RRSet
    pub fn with_txt(self, zone: &str, name: &str, values: &[&str], ttl: u32) -> Self {
        self.state.lock().unwrap().rrsets.insert(
            (zone.to_string(), name.to_string(), RecordType::Txt),
            RRSet::txt(values, ttl),
        );
        self
    }

    /// Make `list_zones` fail with a transport error
    pub fn failing_zone_listing(self) -> Self {
        self.state.lock().unwrap().fail_list_zones = true;
        self
    }

    /// Make `get_rrset` fail with a conflict
    pub fn conflicting_rrset_reads(self) -> Self {
        self.state.lock().unwrap().conflicting_reads = true;
        self
    }

    /// Remove the RRSet right before a delete reaches it
    pub fn vanishing_before_delete(self) -> Self {
        self.state.lock().unwrap().vanish_before_delete = true;
        self
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls excluding zone listing
    pub fn rrset_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::ListZones(_)))
            .collect()
    }

    /// Current content values of a TXT RRSet
    pub fn txt_values(&self, zone: &str, name: &str) -> Option<Vec<String>> {
        self.state
            .lock()
            .unwrap()
            .rrsets
            .get(&(zone.to_string(), name.to_string(), RecordType::Txt))
            .map(RRSet::values)
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check_zone(&self, zone: &str) -> Result<()> {
        if self.state.lock().unwrap().zones.iter().any(|z| z == zone) {
            Ok(())
        } else {
            Err(Error::not_found(format!("zone {}", zone)))
        }
    }
}

fn key(zone: &str, name: &str, record_type: RecordType) -> (String, String, RecordType) {
    (zone.to_string(), name.to_string(), record_type)
}

#[async_trait]
impl ZoneApi for RecordingZoneApi {
    async fn list_zones(&self, filter: &ZoneFilter) -> Result<Vec<ZoneSummary>> {
        self.record(Call::ListZones(filter.clone()));

        let state = self.state.lock().unwrap();
        if state.fail_list_zones {
            return Err(Error::transport("503 Service Unavailable"));
        }

        let limit = filter.limit.unwrap_or(u32::MAX) as usize;
        Ok(state
            .zones
            .iter()
            .filter(|z| {
                filter.name.as_ref().is_none_or(|n| {
                    z.trim_end_matches('.')
                        .to_ascii_lowercase()
                        .ends_with(n.as_str())
                })
            })
            .take(limit)
            .map(|z| ZoneSummary { name: z.clone() })
            .collect())
    }

    async fn get_zone(&self, name: &str) -> Result<Zone> {
        self.record(Call::GetZone(name.to_string()));
        self.check_zone(name)?;
        Ok(Zone {
            id: None,
            name: name.to_string(),
        })
    }

    async fn get_rrset(&self, zone: &str, name: &str, record_type: RecordType) -> Result<RRSet> {
        self.record(Call::GetRRSet {
            zone: zone.to_string(),
            name: name.to_string(),
        });
        self.check_zone(zone)?;

        let state = self.state.lock().unwrap();
        if state.conflicting_reads {
            return Err(Error::conflict(format!("rrset {} {} is locked", name, record_type)));
        }
        state
            .rrsets
            .get(&key(zone, name, record_type))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("rrset {} {}", name, record_type)))
    }

    async fn create_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        rrset: &RRSet,
    ) -> Result<()> {
        self.record(Call::CreateRRSet {
            zone: zone.to_string(),
            name: name.to_string(),
            body: rrset.clone(),
        });
        self.check_zone(zone)?;

        let mut state = self.state.lock().unwrap();
        let key = key(zone, name, record_type);
        if state.rrsets.contains_key(&key) {
            return Err(Error::conflict(format!("rrset {} {} exists", name, record_type)));
        }
        state.rrsets.insert(key, rrset.clone());
        Ok(())
    }

    async fn update_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        rrset: &RRSet,
    ) -> Result<()> {
        self.record(Call::UpdateRRSet {
            zone: zone.to_string(),
            name: name.to_string(),
            body: rrset.clone(),
        });
        self.check_zone(zone)?;

        self.state
            .lock()
            .unwrap()
            .rrsets
            .insert(key(zone, name, record_type), rrset.clone());
        Ok(())
    }

    async fn delete_rrset(&self, zone: &str, name: &str, record_type: RecordType) -> Result<()> {
        self.record(Call::DeleteRRSet {
            zone: zone.to_string(),
            name: name.to_string(),
        });
        self.check_zone(zone)?;

        let mut state = self.state.lock().unwrap();
        let key = key(zone, name, record_type);
        if state.vanish_before_delete {
            state.rrsets.remove(&key);
        }
        state
            .rrsets
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("rrset {} {}", name, record_type)))
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}
