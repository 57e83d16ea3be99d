//! Cloudflare v4 DNS client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, error};

use crate::dns::provider::{ARecordSpec, DnsProvider, DnsRecord, Zone};
use crate::errors::RoadError;

/// Environment variable holding the Cloudflare API token
pub const API_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

/// Error or message entry of a Cloudflare response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// Cloudflare response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// All provider error messages joined with `; `
    pub fn error_summary(&self) -> String {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| match e.code {
                Some(code) if !e.message.is_empty() => format!("{} (code {})", e.message, code),
                Some(code) => format!("code {}", code),
                None => e.message.clone(),
            })
            .filter(|m| !m.is_empty())
            .collect();

        if messages.is_empty() {
            "unknown error".to_string()
        } else {
            messages.join("; ")
        }
    }

    /// Unwrap a successful envelope, or fail with the aggregated messages
    pub fn into_result(self, context: &str) -> Result<Option<T>, RoadError> {
        if !self.success {
            return Err(RoadError::DnsError(format!(
                "{}: {}",
                context,
                self.error_summary()
            )));
        }
        Ok(self.result)
    }
}

/// Cloudflare API client
pub struct CloudflareClient {
    client: Client,
    base_url: String,
    api_token: SecretString,
}

impl CloudflareClient {
    /// Create a new client. Fails without a non-empty API token.
    pub fn new(base_url: &str, api_token: Option<&SecretString>) -> Result<Self, RoadError> {
        let api_token = api_token
            .map(|t| t.expose_secret().trim())
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.to_string()))
            .ok_or_else(|| RoadError::DnsError(format!("{} is not set", API_TOKEN_ENV)))?;

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    /// Read the API token from the process environment
    pub fn token_from_env() -> Option<SecretString> {
        std::env::var(API_TOKEN_ENV).ok().map(SecretString::from)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Option<T>, RoadError> {
        let response = request
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Cloudflare reports failures inside the envelope, also on non-2xx
        match serde_json::from_str::<ApiEnvelope<T>>(&body) {
            Ok(envelope) => {
                if !status.is_success() && envelope.success {
                    error!("{} returned {} with a success envelope", context, status);
                    return Err(RoadError::DnsError(format!("{}: HTTP {}", context, status)));
                }
                envelope.into_result(context)
            }
            Err(e) => {
                error!("{} failed: {} - {}", context, status, body);
                Err(RoadError::DnsError(format!(
                    "{}: HTTP {} with unreadable body ({})",
                    context, status, e
                )))
            }
        }
    }
}

#[async_trait]
impl DnsProvider for CloudflareClient {
    fn name(&self) -> &str {
        "cloudflare"
    }

    async fn list_zones(&self, zone_name: &str) -> Result<Vec<Zone>, RoadError> {
        let url = self.url("/zones");
        debug!("GET {} (name={})", url, zone_name);

        let request = self.client.get(&url).query(&[("name", zone_name)]);
        let zones: Option<Vec<Zone>> = self.send(request, "zone lookup").await?;
        Ok(zones.unwrap_or_default())
    }

    async fn find_a_records(&self, zone_id: &str, fqdn: &str) -> Result<Vec<DnsRecord>, RoadError> {
        let url = self.url(&format!("/zones/{}/dns_records", zone_id));
        debug!("GET {} (type=A, name={})", url, fqdn);

        let request = self
            .client
            .get(&url)
            .query(&[("type", "A"), ("name", fqdn)]);
        let records: Option<Vec<DnsRecord>> = self.send(request, "record lookup").await?;
        Ok(records.unwrap_or_default())
    }

    async fn create_a_record(
        &self,
        zone_id: &str,
        record: &ARecordSpec,
    ) -> Result<DnsRecord, RoadError> {
        let url = self.url(&format!("/zones/{}/dns_records", zone_id));
        debug!("POST {} ({} -> {})", url, record.name, record.content);

        let request = self.client.post(&url).json(record);
        let created: Option<DnsRecord> = self.send(request, "record create").await?;
        created.ok_or_else(|| RoadError::DnsError("record create: response has no result".to_string()))
    }

    async fn update_a_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &ARecordSpec,
    ) -> Result<DnsRecord, RoadError> {
        let url = self.url(&format!("/zones/{}/dns_records/{}", zone_id, record_id));
        debug!("PUT {} ({} -> {})", url, record.name, record.content);

        let request = self.client.put(&url).json(record);
        let updated: Option<DnsRecord> = self.send(request, "record update").await?;
        updated.ok_or_else(|| RoadError::DnsError("record update: response has no result".to_string()))
    }
}
