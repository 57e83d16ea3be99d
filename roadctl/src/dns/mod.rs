//! DNS reconciliation

pub mod cloudflare;
pub mod memory;
pub mod provider;
pub mod reconciler;

pub use provider::{provider_for, ARecordSpec, DnsProvider, DnsRecord, Zone};
pub use reconciler::{DnsReconciler, EnsuredRecord, UpsertAction};
