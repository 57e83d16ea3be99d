//! Idempotent A-record reconciliation
//!
//! `ensure_record` drives one A record for `record_name.zone` to the
//! desired IP. Re-running it with the same input converges on the same
//! record: the second call finds the record created by the first one and
//! updates it in place.
//!
//! The lookup and the upsert are separate provider calls, so two
//! independent invocations racing on the same hostname can both miss the
//! record and both create one. roadctl runs one invocation at a time.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dns::provider::{ARecordSpec, DnsProvider};
use crate::errors::RoadError;
use crate::targets::model::DnsConfig;

/// What the reconciler did to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertAction::Created => write!(f, "created"),
            UpsertAction::Updated => write!(f, "updated"),
        }
    }
}

/// Result of a reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsuredRecord {
    pub record_id: String,
    pub fqdn: String,
    pub action: UpsertAction,
}

/// Reconciles A records through a [`DnsProvider`]
pub struct DnsReconciler {
    provider: Arc<dyn DnsProvider>,
    ttl: u32,
}

impl DnsReconciler {
    pub fn new(provider: Arc<dyn DnsProvider>, ttl: u32) -> Self {
        Self { provider, ttl }
    }

    /// Ensure exactly one A record for `config` points at `config.target_ip`
    pub async fn ensure_record(&self, config: &DnsConfig) -> Result<EnsuredRecord, RoadError> {
        let target_ip = config
            .target_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .ok_or_else(|| {
                RoadError::DnsError(format!("no target IP configured for {}", config.fqdn()))
            })?;
        let fqdn = config.fqdn();

        // 1. Zone
        let zone_id = self.resolve_zone_id(&config.zone).await?;
        debug!("Zone {} resolved to {}", config.zone, zone_id);

        // 2. Existing record
        let existing = self.provider.find_a_records(&zone_id, &fqdn).await?;
        if existing.len() > 1 {
            warn!(
                "{} A records named {}, updating the first one",
                existing.len(),
                fqdn
            );
        }
        let existing_id = existing.into_iter().find_map(|record| record.id);

        // 3. Upsert
        let spec = ARecordSpec::new(fqdn.clone(), target_ip, self.ttl);
        let (record, action) = match existing_id {
            Some(record_id) => {
                debug!("Updating A record {} ({})", record_id, fqdn);
                let record = self
                    .provider
                    .update_a_record(&zone_id, &record_id, &spec)
                    .await?;
                (record, UpsertAction::Updated)
            }
            None => {
                debug!("Creating A record {}", fqdn);
                let record = self.provider.create_a_record(&zone_id, &spec).await?;
                (record, UpsertAction::Created)
            }
        };

        // 4. Result id
        let record_id = record.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            RoadError::DnsError(format!("record {}: response has no record id", action))
        })?;

        info!(
            "DNS {} {} -> {} via {} (record {})",
            action,
            fqdn,
            target_ip,
            self.provider.name(),
            record_id
        );

        Ok(EnsuredRecord {
            record_id,
            fqdn,
            action,
        })
    }

    async fn resolve_zone_id(&self, zone: &str) -> Result<String, RoadError> {
        let zones = self.provider.list_zones(zone).await?;
        zones
            .into_iter()
            .find(|z| z.name.eq_ignore_ascii_case(zone))
            .map(|z| z.id)
            .ok_or_else(|| RoadError::DnsError(format!("zone not found: {}", zone)))
    }
}
