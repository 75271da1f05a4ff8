// # dns01-core
//
// Core library for completing ACME DNS-01 challenges against a managed DNS
// provider.
//
// ## Architecture Overview
//
// - **ZoneApi**: Trait for the provider's zone and RRSet operations
// - **ChallengeReconciler**: Resolves the owning zone of a validation domain and
//   idempotently adds or removes the challenge TXT record
// - **Config**: Credentials, endpoint overrides and challenge settings
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from the HTTP transport
// 2. **Idempotency**: Present merges into existing content, cleanup tolerates absence
// 3. **Stateless**: Nothing is cached between operations; every call re-reads the provider
// 4. **Library-First**: The hook binary is a thin wrapper around this crate

pub mod config;
pub mod error;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use config::{ChallengeConfig, Credentials, Dns01Config, EndpointOverrides};
pub use error::{Error, Result};
pub use reconciler::{ChallengeReconciler, CleanupOutcome, PresentOutcome};
pub use traits::{RRSet, RecordType, ResourceRecord, Zone, ZoneApi, ZoneFilter, ZoneSummary};
