//! Deployment target models

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named, statically configured description of what to deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTarget {
    /// Target name, also the repository name
    pub repo: String,

    /// Port the entry process listens on
    pub port: u16,

    /// Public domain served by this target
    pub domain: String,

    /// Entry command string
    pub entry: String,

    /// Dotenv file loaded before launch
    pub env_file: String,

    /// Runtime tag (e.g. "node")
    pub runtime: String,

    /// Agent identity recorded in the journal
    pub agent: String,

    /// Journal configuration
    pub memory: MemoryConfig,

    /// DNS record to reconcile
    pub dns: DnsConfig,
}

/// Journal configuration carried by a target and copied into every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    /// Content hash of the deployed state
    pub hash: String,

    /// Human readable reason for the deployment
    pub reason: String,

    /// Journal file path
    pub journal: String,
}

/// Desired DNS state for a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    /// Provider tag
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Zone name, e.g. "blackroad.systems"
    pub zone: String,

    /// Record name inside the zone, e.g. "web"
    pub record_name: String,

    /// A record content. Falls back to `TARGET_IP` when absent.
    #[serde(default)]
    pub target_ip: Option<String>,
}

fn default_provider() -> String {
    "cloudflare".to_string()
}

impl DnsConfig {
    /// Fully qualified hostname (`record_name.zone`)
    pub fn fqdn(&self) -> String {
        let name = self.record_name.trim_end_matches('.');
        let zone = self.zone.trim_matches('.');
        if name.is_empty() || name == "@" {
            zone.to_string()
        } else {
            format!("{}.{}", name, zone)
        }
    }
}

impl fmt::Display for DnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}",
            self.provider,
            self.fqdn(),
            self.target_ip.as_deref().unwrap_or("$TARGET_IP")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns(record_name: &str) -> DnsConfig {
        DnsConfig {
            provider: "cloudflare".to_string(),
            zone: "blackroad.systems".to_string(),
            record_name: record_name.to_string(),
            target_ip: Some("5.6.7.8".to_string()),
        }
    }

    #[test]
    fn test_fqdn() {
        assert_eq!(dns("web").fqdn(), "web.blackroad.systems");
        assert_eq!(dns("@").fqdn(), "blackroad.systems");
    }

    #[test]
    fn test_display() {
        assert_eq!(dns("web").to_string(), "cloudflare:web.blackroad.systems -> 5.6.7.8");
    }

    #[test]
    fn test_target_json_shape() {
        let json = r#"{
            "repo": "blackroad-web",
            "port": 3100,
            "domain": "web.blackroad.systems",
            "entry": "npm run start",
            "envFile": ".env",
            "runtime": "node",
            "agent": "lucidia",
            "memory": {"hash": "abc", "reason": "launch", "journal": "memory/journal.json"},
            "dns": {"zone": "blackroad.systems", "recordName": "web"}
        }"#;
        let target: DeploymentTarget = serde_json::from_str(json).unwrap();
        assert_eq!(target.env_file, ".env");
        assert_eq!(target.dns.provider, "cloudflare");
        assert!(target.dns.target_ip.is_none());
    }
}
