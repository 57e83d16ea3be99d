//! DNS provider abstraction

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::dns::cloudflare::CloudflareClient;
use crate::dns::memory::InMemoryDnsProvider;
use crate::errors::RoadError;
use crate::targets::model::DnsConfig;

/// A DNS zone as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// A DNS record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider record id; absent on malformed responses
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub record_type: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub ttl: u32,

    #[serde(default)]
    pub proxied: bool,
}

/// Desired content of an A record, sent on create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ARecordSpec {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

impl ARecordSpec {
    /// Unproxied A record for `fqdn` pointing at `ip`
    pub fn new(fqdn: impl Into<String>, ip: impl Into<String>, ttl: u32) -> Self {
        Self {
            record_type: "A",
            name: fqdn.into(),
            content: ip.into(),
            ttl,
            proxied: false,
        }
    }
}

/// Zone lookup and A-record CRUD against a DNS provider
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Provider tag, e.g. "cloudflare"
    fn name(&self) -> &str;

    /// Zones whose name matches `zone_name`
    async fn list_zones(&self, zone_name: &str) -> Result<Vec<Zone>, RoadError>;

    /// A records in `zone_id` named exactly `fqdn`
    async fn find_a_records(&self, zone_id: &str, fqdn: &str) -> Result<Vec<DnsRecord>, RoadError>;

    /// Create an A record
    async fn create_a_record(
        &self,
        zone_id: &str,
        record: &ARecordSpec,
    ) -> Result<DnsRecord, RoadError>;

    /// Overwrite the A record `record_id`
    async fn update_a_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &ARecordSpec,
    ) -> Result<DnsRecord, RoadError>;
}

/// Build the provider named by a target's `dns.provider` tag.
///
/// The Cloudflare provider requires an API token; its absence fails here,
/// before any network call. The memory provider hosts the target's zone
/// and starts without records.
pub fn provider_for(
    config: &DnsConfig,
    cloudflare_base_url: &str,
    api_token: Option<&SecretString>,
) -> Result<Arc<dyn DnsProvider>, RoadError> {
    match config.provider.to_lowercase().as_str() {
        "cloudflare" => Ok(Arc::new(CloudflareClient::new(cloudflare_base_url, api_token)?)),
        "memory" => Ok(Arc::new(InMemoryDnsProvider::with_zones([config.zone.as_str()]))),
        other => Err(RoadError::DnsError(format!("unsupported DNS provider: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns_config(provider: &str) -> DnsConfig {
        DnsConfig {
            provider: provider.to_string(),
            zone: "blackroad.systems".to_string(),
            record_name: "web".to_string(),
            target_ip: Some("5.6.7.8".to_string()),
        }
    }

    #[test]
    fn test_cloudflare_without_token_fails() {
        let config = dns_config("cloudflare");
        let err = provider_for(&config, "https://api.cloudflare.com/client/v4", None)
            .err()
            .unwrap();
        assert!(matches!(err, RoadError::DnsError(msg) if msg.contains("CLOUDFLARE_API_TOKEN")));
    }

    #[test]
    fn test_unknown_provider_fails() {
        let err = provider_for(&dns_config("route53"), "", None).err().unwrap();
        assert!(matches!(err, RoadError::DnsError(_)));
    }

    #[tokio::test]
    async fn test_memory_provider_hosts_target_zone() {
        let provider = provider_for(&dns_config("Memory"), "", None).unwrap();

        let zones = provider.list_zones("blackroad.systems").await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(provider.name(), "memory");
    }

    #[test]
    fn test_a_record_spec_body() {
        let spec = ARecordSpec::new("web.blackroad.systems", "5.6.7.8", 1);
        let body = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "type": "A",
                "name": "web.blackroad.systems",
                "content": "5.6.7.8",
                "ttl": 1,
                "proxied": false
            })
        );
    }
}
