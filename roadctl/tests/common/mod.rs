//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::Path;

use roadctl::deploy::orchestrator::OrchestratorOptions;
use roadctl::launch::process::LaunchOptions;
use roadctl::storage::layout::StorageLayout;
use roadctl::targets::model::{DeploymentTarget, DnsConfig, MemoryConfig};

pub const ZONE: &str = "blackroad.systems";

pub fn web_dns() -> DnsConfig {
    DnsConfig {
        provider: "cloudflare".to_string(),
        zone: ZONE.to_string(),
        record_name: "web".to_string(),
        target_ip: Some("5.6.7.8".to_string()),
    }
}

pub fn web_target(entry: &str) -> DeploymentTarget {
    DeploymentTarget {
        repo: "blackroad-web".to_string(),
        port: 3100,
        domain: "web.blackroad.systems".to_string(),
        entry: entry.to_string(),
        env_file: ".env".to_string(),
        runtime: "node".to_string(),
        agent: "lucidia".to_string(),
        memory: MemoryConfig {
            hash: "abc123".to_string(),
            reason: "integration test".to_string(),
            journal: "memory/journal.json".to_string(),
        },
        dns: web_dns(),
    }
}

pub fn options_in(base: &Path, skip_entry: bool) -> OrchestratorOptions {
    OrchestratorOptions {
        layout: StorageLayout::new(base),
        launch: LaunchOptions { skip_entry },
        show_progress: false,
        ..OrchestratorOptions::default()
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
