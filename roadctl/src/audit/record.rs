//! Journal record models

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::targets::model::{DeploymentTarget, MemoryConfig};
use crate::utils::sha256_hash;

/// Snapshot tag written into every genesis snapshot
pub const GENESIS_TAG: &str = "genesis";

/// Input of [`AuditJournal::record_deployment`](crate::audit::AuditJournal::record_deployment)
#[derive(Debug, Clone)]
pub struct DeployRequest<'a> {
    pub target: &'a DeploymentTarget,

    /// Human readable description of the reconciled DNS record
    pub dns_target: String,

    pub timestamp: DateTime<Utc>,
}

impl<'a> DeployRequest<'a> {
    pub fn new(target: &'a DeploymentTarget, dns_target: impl Into<String>) -> Self {
        Self {
            target,
            dns_target: dns_target.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// One journal entry. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub id: String,
    pub timestamp: String,
    pub repo: String,
    pub domain: String,
    pub port: u16,
    pub entry: String,
    pub runtime: String,
    pub agent: String,
    pub memory: MemoryConfig,
    pub dns_target: String,
    pub env_file: String,
}

impl DeploymentRecord {
    /// Build the record for a request
    pub fn from_request(request: &DeployRequest<'_>) -> Self {
        let target = request.target;
        let timestamp = request
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        Self {
            id: deployment_id(&timestamp, &target.domain, target.port),
            timestamp,
            repo: target.repo.clone(),
            domain: target.domain.clone(),
            port: target.port,
            entry: target.entry.clone(),
            runtime: target.runtime.clone(),
            agent: target.agent.clone(),
            memory: target.memory.clone(),
            dns_target: request.dns_target.clone(),
            env_file: target.env_file.clone(),
        }
    }
}

/// Deployment id: hex SHA-256 of `timestamp || domain || port`.
///
/// Two deployments of the same domain and port within one millisecond get
/// the same id.
pub fn deployment_id(timestamp: &str, domain: &str, port: u16) -> String {
    sha256_hash(format!("{}{}{}", timestamp, domain, port).as_bytes())
}

/// Pointer to the most recent record written by this process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisSnapshot {
    pub snapshot: String,

    /// Journal path relative to the snapshot directory
    pub journal: String,

    pub record: DeploymentRecord,
}

impl GenesisSnapshot {
    pub fn new(journal: impl Into<String>, record: DeploymentRecord) -> Self {
        Self {
            snapshot: GENESIS_TAG.to_string(),
            journal: journal.into(),
            record,
        }
    }
}
