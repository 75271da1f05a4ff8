// # Zone API Trait
//
// Defines the provider operations the challenge reconciler needs: zone
// lookup and CRUD on a single RRSet.
//
// ## Implementations
//
// - G-Core: `dns01-provider-gcore` crate
//
// ## Error Contract
//
// Implementations classify HTTP outcomes into the closed `Error` taxonomy:
//
// - 409 → `Error::Conflict` (drives the merge path on create)
// - 404 → `Error::NotFound` (tolerated during cleanup)
// - 400 / 500 → `Error::Api`
// - anything else → `Error::Transport`
//
// Implementations must not retry and must not cache zone or record state
// between calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Text record (used for DNS-01 challenges)
    Txt,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter for listing zones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneFilter {
    /// Zone name filter
    pub name: Option<String>,
    /// Maximum number of zones returned
    pub limit: Option<u32>,
}

impl ZoneFilter {
    /// Filter zones by name with a result limit
    pub fn by_name(name: impl Into<String>, limit: u32) -> Self {
        Self {
            name: Some(name.into()),
            limit: Some(limit),
        }
    }
}

/// Entry of a zone listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoneSummary {
    /// Zone name (e.g. "example.com")
    pub name: String,
}

/// Zone descriptor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Zone {
    /// Provider-specific zone ID
    #[serde(default)]
    pub id: Option<u64>,
    /// Zone name (e.g. "example.com")
    pub name: String,
}

/// One resource record of an RRSet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Record content; TXT records written here carry exactly one value
    pub content: Vec<String>,
    /// Whether the record is served
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ResourceRecord {
    /// An enabled record holding a single value
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            content: vec![value.into()],
            enabled: true,
        }
    }

    /// The record's primary content value
    pub fn value(&self) -> Option<&str> {
        self.content.first().map(String::as_str)
    }
}

fn default_enabled() -> bool {
    true
}

/// Resource record set: all records of one name and type in a zone
///
/// Serializes to the request body `{"resource_records": [...], "ttl": n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRSet {
    /// Records in provider order
    pub resource_records: Vec<ResourceRecord>,
    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: u32,
}

impl RRSet {
    /// Build a TXT RRSet body with one enabled record per content value
    pub fn txt<S: AsRef<str>>(contents: &[S], ttl: u32) -> Self {
        Self {
            resource_records: contents
                .iter()
                .map(|c| ResourceRecord::single(c.as_ref()))
                .collect(),
            ttl,
        }
    }

    /// Primary content value of every record, in order
    pub fn values(&self) -> Vec<String> {
        self.resource_records
            .iter()
            .filter_map(|r| r.value().map(str::to_string))
            .collect()
    }
}

/// Trait for DNS provider zone APIs
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks. The
/// only state they may hold is the immutable authenticated session.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List zones of the account matching `filter`
    async fn list_zones(&self, filter: &ZoneFilter) -> Result<Vec<ZoneSummary>, crate::Error>;

    /// Get a zone by name
    ///
    /// Fails with `Error::NotFound` if the zone does not exist.
    async fn get_zone(&self, name: &str) -> Result<Zone, crate::Error>;

    /// Get an RRSet
    ///
    /// Fails with `Error::NotFound` if the RRSet does not exist.
    async fn get_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<RRSet, crate::Error>;

    /// Create an RRSet
    ///
    /// Fails with `Error::Conflict` if an RRSet with this name and type
    /// already exists.
    async fn create_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        rrset: &RRSet,
    ) -> Result<(), crate::Error>;

    /// Replace the content of an existing RRSet
    async fn update_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        rrset: &RRSet,
    ) -> Result<(), crate::Error>;

    /// Delete an RRSet
    ///
    /// Fails with `Error::NotFound` if the RRSet does not exist.
    async fn delete_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_body_single_value() {
        let body = serde_json::to_value(RRSet::txt(&["text"], 300)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "resource_records": [{"content": ["text"], "enabled": true}],
                "ttl": 300
            })
        );
    }

    #[test]
    fn txt_body_two_values() {
        let body = serde_json::to_value(RRSet::txt(&["text1", "text2"], 300)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "resource_records": [
                    {"content": ["text1"], "enabled": true},
                    {"content": ["text2"], "enabled": true}
                ],
                "ttl": 300
            })
        );
    }

    #[test]
    fn values_skip_empty_records_and_ignore_enabled_flag() {
        let rrset: RRSet = serde_json::from_value(serde_json::json!({
            "ttl": 300,
            "resource_records": [
                {"content": [], "enabled": true},
                {"content": ["disabled"], "enabled": false},
                {"content": ["first", "second"], "enabled": true}
            ]
        }))
        .unwrap();

        assert_eq!(rrset.values(), vec!["disabled", "first"]);
        assert!(
            RRSet::txt(rrset.values().as_slice(), 300)
                .resource_records
                .iter()
                .all(|r| r.enabled)
        );
    }

    #[test]
    fn rrset_ignores_extra_response_fields() {
        let rrset: RRSet = serde_json::from_value(serde_json::json!({
            "name": "_acme-challenge.example.com",
            "type": "TXT",
            "ttl": 120,
            "resource_records": [
                {"id": 1, "content": ["coexisting content"], "enabled": true},
                {"id": 2, "content": ["123456790"]}
            ]
        }))
        .unwrap();

        assert_eq!(rrset.ttl, 120);
        assert_eq!(rrset.values(), vec!["coexisting content", "123456790"]);
        assert!(rrset.resource_records[1].enabled);
    }

    #[test]
    fn record_type_wire_names() {
        assert_eq!(RecordType::Txt.to_string(), "TXT");
        assert_eq!(RecordType::Aaaa.as_str(), "AAAA");
        assert_eq!(
            serde_json::to_value(RecordType::Cname).unwrap(),
            serde_json::json!("CNAME")
        );
    }
}
