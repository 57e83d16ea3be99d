//! In-memory DNS provider
//!
//! Holds zones and records in process memory. Selected with the `memory`
//! provider tag for dry runs: the target's zone is hosted and records live
//! only for the invocation. The tests use it to observe every call the
//! reconciler makes.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::dns::provider::{ARecordSpec, DnsProvider, DnsRecord, Zone};
use crate::errors::RoadError;

/// Number of calls made against an [`InMemoryDnsProvider`], per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsCallCounts {
    pub list_zones: usize,
    pub find_a_records: usize,
    pub create_a_record: usize,
    pub update_a_record: usize,
}

impl DnsCallCounts {
    pub fn total(&self) -> usize {
        self.list_zones + self.find_a_records + self.create_a_record + self.update_a_record
    }
}

#[derive(Debug)]
struct StoredRecord {
    zone_id: String,
    record: DnsRecord,
}

/// DNS provider backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryDnsProvider {
    zones: Mutex<Vec<Zone>>,
    records: Mutex<Vec<StoredRecord>>,
    next_id: AtomicUsize,
    list_zones_calls: AtomicUsize,
    find_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl InMemoryDnsProvider {
    /// Create an empty provider that knows no zones
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that hosts the given zone names
    pub fn with_zones<I, S>(zone_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let zones = zone_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Zone {
                id: format!("zone-{}", i + 1),
                name: name.into(),
            })
            .collect();

        Self {
            zones: Mutex::new(zones),
            ..Self::default()
        }
    }

    /// Insert a record directly, bypassing the call counters
    pub async fn seed_record(&self, zone_id: &str, record: DnsRecord) {
        self.records.lock().await.push(StoredRecord {
            zone_id: zone_id.to_string(),
            record,
        });
    }

    /// All A records named `fqdn`, across zones
    pub async fn records_named(&self, fqdn: &str) -> Vec<DnsRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|stored| stored.record.name == fqdn && stored.record.record_type == "A")
            .map(|stored| stored.record.clone())
            .collect()
    }

    /// Calls made so far
    pub fn calls(&self) -> DnsCallCounts {
        DnsCallCounts {
            list_zones: self.list_zones_calls.load(Ordering::SeqCst),
            find_a_records: self.find_calls.load(Ordering::SeqCst),
            create_a_record: self.create_calls.load(Ordering::SeqCst),
            update_a_record: self.update_calls.load(Ordering::SeqCst),
        }
    }

    fn to_record(id: String, spec: &ARecordSpec) -> DnsRecord {
        DnsRecord {
            id: Some(id),
            name: spec.name.clone(),
            record_type: spec.record_type.to_string(),
            content: spec.content.clone(),
            ttl: spec.ttl,
            proxied: spec.proxied,
        }
    }
}

#[async_trait]
impl DnsProvider for InMemoryDnsProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_zones(&self, zone_name: &str) -> Result<Vec<Zone>, RoadError> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .zones
            .lock()
            .await
            .iter()
            .filter(|zone| zone.name.eq_ignore_ascii_case(zone_name))
            .cloned()
            .collect())
    }

    async fn find_a_records(&self, zone_id: &str, fqdn: &str) -> Result<Vec<DnsRecord>, RoadError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|stored| {
                stored.zone_id == zone_id
                    && stored.record.record_type == "A"
                    && stored.record.name == fqdn
            })
            .map(|stored| stored.record.clone())
            .collect())
    }

    async fn create_a_record(
        &self,
        zone_id: &str,
        record: &ARecordSpec,
    ) -> Result<DnsRecord, RoadError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created = Self::to_record(id, record);
        self.seed_record(zone_id, created.clone()).await;
        Ok(created)
    }

    async fn update_a_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &ARecordSpec,
    ) -> Result<DnsRecord, RoadError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().await;
        let stored = records
            .iter_mut()
            .find(|stored| {
                stored.zone_id == zone_id && stored.record.id.as_deref() == Some(record_id)
            })
            .ok_or_else(|| {
                RoadError::DnsError(format!("record update: record {} not found", record_id))
            })?;

        stored.record = Self::to_record(record_id.to_string(), record);
        Ok(stored.record.clone())
    }
}
