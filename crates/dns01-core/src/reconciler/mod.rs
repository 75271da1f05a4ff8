//! Challenge record reconciler
//!
//! The reconciler drives one DNS-01 operation against a [`ZoneApi`]:
//!
//! ```text
//! present(domain, record, value)
//!   find_zone(domain) ──► create_rrset ──ok──► Created
//!                              │
//!                          Conflict
//!                              ▼
//!                         get_rrset ──► merge value ──► update_rrset ──► Merged
//!
//! cleanup(domain, record)
//!   find_zone(domain) ──► get_rrset ──► delete_rrset ──► Removed
//!        │                   │
//!   no zone / 404       404 / 409 ─────────────────────► AlreadyAbsent
//! ```
//!
//! No state is kept between calls. Two concurrent `present` calls on the same
//! record name can lose an update; callers serialize those.

use crate::error::{Error, Result};
use crate::traits::{RRSet, RecordType, ZoneApi, ZoneFilter};

/// Maximum number of zones requested when resolving a domain
pub const ZONE_LOOKUP_LIMIT: u32 = 100;

/// Result of [`ChallengeReconciler::present`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentOutcome {
    /// A new RRSet was created holding only the challenge value
    Created {
        /// Zone that owns the record
        zone: String,
    },
    /// The RRSet already existed and the value was merged into it
    Merged {
        /// Zone that owns the record
        zone: String,
        /// Number of values present before the merge
        existing: usize,
        /// Whether the value was appended (false if it was already present)
        added: bool,
    },
}

/// Result of [`ChallengeReconciler::cleanup`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The RRSet was deleted
    Removed {
        /// Zone that owned the record
        zone: String,
    },
    /// The zone or RRSet did not exist (no-op)
    AlreadyAbsent,
}

/// Reconciles DNS-01 challenge TXT records with a provider
pub struct ChallengeReconciler {
    api: Box<dyn ZoneApi>,
}

impl ChallengeReconciler {
    /// Create a reconciler over a provider API
    pub fn new(api: Box<dyn ZoneApi>) -> Self {
        Self { api }
    }

    /// Ensure the challenge value is present in the TXT RRSet `record_name`
    ///
    /// Creates the RRSet if it does not exist. If it does, the RRSet is
    /// rewritten from the first content value of each existing record, with
    /// `value` appended unless already present. Records without content are
    /// dropped and every rewritten record is enabled.
    ///
    /// # Errors
    ///
    /// - `Error::ZoneResolution` if no managed zone owns `domain`
    /// - any provider error other than the create conflict
    pub async fn present(
        &self,
        domain: &str,
        record_name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<PresentOutcome> {
        let zone = self.find_zone(domain).await?;

        tracing::debug!(
            "Creating TXT record {} in zone {} via {}",
            record_name,
            zone,
            self.api.provider_name()
        );

        let rrset = RRSet::txt(&[value], ttl);
        match self
            .api
            .create_rrset(&zone, record_name, RecordType::Txt, &rrset)
            .await
        {
            Ok(()) => {
                tracing::info!("Created TXT record {} in zone {}", record_name, zone);
                Ok(PresentOutcome::Created { zone })
            }
            Err(Error::Conflict(msg)) => {
                tracing::debug!("TXT record {} already exists, merging: {}", record_name, msg);

                let current = self
                    .api
                    .get_rrset(&zone, record_name, RecordType::Txt)
                    .await?
                    .values();
                let existing = current.len();
                let added = !current.iter().any(|v| v == value);
                let merged = merge_content(current, value);

                self.api
                    .update_rrset(
                        &zone,
                        record_name,
                        RecordType::Txt,
                        &RRSet::txt(merged.as_slice(), ttl),
                    )
                    .await?;

                tracing::info!(
                    "Updated TXT record {} in zone {} ({} values, challenge value {})",
                    record_name,
                    zone,
                    merged.len(),
                    if added { "added" } else { "already present" }
                );
                Ok(PresentOutcome::Merged {
                    zone,
                    existing,
                    added,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Ensure the TXT RRSet `record_name` is absent
    ///
    /// A missing zone or RRSet is an acceptable end state and reported as
    /// [`CleanupOutcome::AlreadyAbsent`].
    pub async fn cleanup(&self, domain: &str, record_name: &str) -> Result<CleanupOutcome> {
        let zone = match self.find_zone(domain).await {
            Ok(zone) => zone,
            Err(e @ (Error::ZoneResolution { .. } | Error::NotFound(_))) => {
                tracing::info!("Skipping cleanup of {}: {}", record_name, e);
                return Ok(CleanupOutcome::AlreadyAbsent);
            }
            Err(e) => return Err(e),
        };

        match self.api.get_rrset(&zone, record_name, RecordType::Txt).await {
            Ok(_) => {}
            Err(e @ (Error::NotFound(_) | Error::Conflict(_))) => {
                tracing::info!("Skipping cleanup of {}: {}", record_name, e);
                return Ok(CleanupOutcome::AlreadyAbsent);
            }
            Err(e) => return Err(e),
        }

        match self
            .api
            .delete_rrset(&zone, record_name, RecordType::Txt)
            .await
        {
            Ok(()) => {
                tracing::info!("Deleted TXT record {} from zone {}", record_name, zone);
                Ok(CleanupOutcome::Removed { zone })
            }
            Err(Error::NotFound(msg)) => {
                tracing::info!("TXT record {} vanished before delete: {}", record_name, msg);
                Ok(CleanupOutcome::AlreadyAbsent)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve the managed zone that owns `domain`
    ///
    /// Lists the account's zones under the two-label base domain once, then
    /// returns the most specific candidate suffix found among them.
    pub async fn find_zone(&self, domain: &str) -> Result<String> {
        let candidates = zone_candidates(domain)?;
        let base = base_domain(domain)?;

        tracing::debug!("Resolving zone for {} (candidates: {:?})", domain, candidates);

        let zones = self
            .api
            .list_zones(&ZoneFilter::by_name(base.as_str(), ZONE_LOOKUP_LIMIT))
            .await?;
        if zones.len() >= ZONE_LOOKUP_LIMIT as usize {
            tracing::warn!(
                "Zone listing for {} hit the limit of {}, results may be truncated",
                base,
                ZONE_LOOKUP_LIMIT
            );
        }
        let names: Vec<String> = zones.iter().map(|z| normalize(&z.name)).collect();

        match candidates.iter().find(|c| names.contains(c)) {
            Some(zone) => {
                tracing::debug!("Resolved {} to zone {}", domain, zone);
                Ok(zone.clone())
            }
            None => Err(Error::zone_resolution(domain, candidates)),
        }
    }
}

/// Lowercase and strip the trailing root dot
fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn labels(domain: &str) -> Result<Vec<String>> {
    let domain = normalize(domain);
    let labels: Vec<String> = domain.split('.').map(str::to_string).collect();

    if labels.len() < 2 || labels.iter().any(String::is_empty) {
        return Err(Error::config(format!("Invalid domain name: {}", domain)));
    }

    Ok(labels)
}

/// Candidate zone names for `domain`, most specific first
///
/// Leading labels are dropped one at a time while at least two labels remain.
/// The domain itself is only a candidate when it has exactly two labels.
///
/// `a.b.example.com` → `["b.example.com", "example.com"]`
pub fn zone_candidates(domain: &str) -> Result<Vec<String>> {
    let labels = labels(domain)?;

    if labels.len() == 2 {
        return Ok(vec![labels.join(".")]);
    }

    Ok((1..=labels.len() - 2)
        .map(|skip| labels[skip..].join("."))
        .collect())
}

/// The last two labels of `domain` (`a.b.example.com` → `example.com`)
pub fn base_domain(domain: &str) -> Result<String> {
    let labels = labels(domain)?;
    Ok(labels[labels.len() - 2..].join("."))
}

/// Append `value` to `existing` unless it is already present
///
/// Existing order is preserved; duplicates already on the provider side are
/// collapsed so the update never carries the same content twice.
pub fn merge_content(existing: Vec<String>, value: &str) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + 1);
    for v in existing {
        if !merged.contains(&v) {
            merged.push(v);
        }
    }
    if !merged.iter().any(|v| v == value) {
        merged.push(value.to_string());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_skip_the_full_name() {
        assert_eq!(
            zone_candidates("test3.test2.test1.example.com").unwrap(),
            vec!["test2.test1.example.com", "test1.example.com", "example.com"]
        );
        assert_eq!(
            zone_candidates("_acme-challenge.example.com").unwrap(),
            vec!["example.com"]
        );
    }

    #[test]
    fn two_label_domain_is_its_own_candidate() {
        assert_eq!(zone_candidates("Example.COM.").unwrap(), vec!["example.com"]);
    }

    #[test]
    fn invalid_domains_are_rejected() {
        assert!(matches!(zone_candidates("localhost"), Err(Error::Config(_))));
        assert!(matches!(zone_candidates(""), Err(Error::Config(_))));
        assert!(matches!(zone_candidates("a..example.com"), Err(Error::Config(_))));
    }

    #[test]
    fn base_domain_is_last_two_labels() {
        assert_eq!(base_domain("a.b.c.example.com").unwrap(), "example.com");
        assert_eq!(base_domain("example.com").unwrap(), "example.com");
    }

    #[test]
    fn merge_appends_new_value() {
        let merged = merge_content(vec!["other-value".to_string()], "value");
        assert_eq!(merged, vec!["other-value", "value"]);
    }

    #[test]
    fn merge_skips_present_value() {
        let merged = merge_content(
            vec!["coexisting content".to_string(), "123456790".to_string()],
            "123456790",
        );
        assert_eq!(merged, vec!["coexisting content", "123456790"]);
    }

    #[test]
    fn merge_collapses_existing_duplicates() {
        let merged = merge_content(vec!["a".to_string(), "a".to_string()], "b");
        assert_eq!(merged, vec!["a", "b"]);
    }
}
