//! Static target registry

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::RoadError;
use crate::filesys::file::File;
use crate::targets::model::{DeploymentTarget, DnsConfig, MemoryConfig};

/// Named deployment targets, ordered by name
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: BTreeMap<String, DeploymentTarget>,
}

impl TargetRegistry {
    /// Build a registry from a list of targets; later duplicates replace earlier ones
    pub fn from_targets(targets: impl IntoIterator<Item = DeploymentTarget>) -> Self {
        let mut registry = Self::default();
        for target in targets {
            registry.insert(target);
        }
        registry
    }

    /// The targets compiled into roadctl
    pub fn builtin() -> Self {
        Self::from_targets([
            DeploymentTarget {
                repo: "blackroad-web".to_string(),
                port: 3100,
                domain: "web.blackroad.systems".to_string(),
                entry: "npm run start".to_string(),
                env_file: ".env".to_string(),
                runtime: "node".to_string(),
                agent: "lucidia".to_string(),
                memory: MemoryConfig {
                    hash: "genesis".to_string(),
                    reason: "web front door".to_string(),
                    journal: "memory/journal.json".to_string(),
                },
                dns: DnsConfig {
                    provider: "cloudflare".to_string(),
                    zone: "blackroad.systems".to_string(),
                    record_name: "web".to_string(),
                    target_ip: None,
                },
            },
            DeploymentTarget {
                repo: "blackroad-api".to_string(),
                port: 4000,
                domain: "api.blackroad.systems".to_string(),
                entry: "node server.js".to_string(),
                env_file: ".env.api".to_string(),
                runtime: "node".to_string(),
                agent: "lucidia".to_string(),
                memory: MemoryConfig {
                    hash: "genesis".to_string(),
                    reason: "public api".to_string(),
                    journal: "memory/journal.json".to_string(),
                },
                dns: DnsConfig {
                    provider: "cloudflare".to_string(),
                    zone: "blackroad.systems".to_string(),
                    record_name: "api".to_string(),
                    target_ip: None,
                },
            },
        ])
    }

    /// Add or replace a target
    pub fn insert(&mut self, target: DeploymentTarget) {
        self.targets.insert(target.repo.clone(), target);
    }

    /// Merge targets from a JSON array file
    pub async fn extend_from_file(&mut self, file: &File) -> Result<(), RoadError> {
        let targets: Vec<DeploymentTarget> = file.read_json().await.map_err(|e| {
            RoadError::ConfigError(format!(
                "unable to read targets file {}: {}",
                file.path().display(),
                e
            ))
        })?;

        debug!(
            "Loaded {} targets from {}",
            targets.len(),
            file.path().display()
        );
        for target in targets {
            self.insert(target);
        }
        Ok(())
    }

    /// Target names in order
    pub fn names(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    /// Look up a target by name
    pub fn get(&self, name: &str) -> Result<&DeploymentTarget, RoadError> {
        self.targets.get(name).ok_or_else(|| {
            RoadError::ConfigError(format!(
                "unknown target '{}'. Available targets: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
