//! Deploy orchestrator
//!
//! Runs one named target through env loading, DNS reconciliation, audit
//! journaling and process launch, in that order. The first failing stage
//! aborts the run. Completed stages are not rolled back: a DNS change or a
//! journal entry made before a later failure stays in place.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use colored::Colorize;
use secrecy::SecretString;
use tracing::{error, info};

use crate::audit::journal::AuditJournal;
use crate::audit::record::{DeployRequest, DeploymentRecord};
use crate::deploy::fsm::{DeployEvent, DeployFsm, DeployState};
use crate::dns::cloudflare::CloudflareClient;
use crate::dns::provider::{provider_for, DnsProvider};
use crate::dns::reconciler::{DnsReconciler, EnsuredRecord};
use crate::env::loader::load_env_file;
use crate::errors::RoadError;
use crate::filesys::file::File;
use crate::launch::process::{LaunchOptions, ProcessLauncher};
use crate::storage::layout::StorageLayout;
use crate::storage::settings::{CloudflareSettings, Settings};
use crate::targets::model::{DeploymentTarget, DnsConfig};
use crate::targets::registry::TargetRegistry;

/// Fallback source for a target's A record content
pub const TARGET_IP_ENV: &str = "TARGET_IP";

/// Orchestrator options
#[derive(Debug)]
pub struct OrchestratorOptions {
    /// Where relative target paths and the snapshot directory live
    pub layout: StorageLayout,

    /// Cloudflare API configuration
    pub cloudflare: CloudflareSettings,

    /// Cloudflare API token
    pub api_token: Option<SecretString>,

    /// TTL applied to the reconciled A record
    pub dns_ttl: u32,

    /// Process launcher options
    pub launch: LaunchOptions,

    /// Print a progress line per completed stage
    pub show_progress: bool,
}

impl OrchestratorOptions {
    /// Options from settings and the process environment
    pub fn from_settings(settings: &Settings, layout: StorageLayout) -> Self {
        Self {
            layout: layout.with_snapshot_dir(settings.snapshot_dir.clone()),
            cloudflare: settings.cloudflare.clone(),
            api_token: CloudflareClient::token_from_env(),
            dns_ttl: settings.dns_ttl,
            launch: LaunchOptions::from_env(),
            show_progress: true,
        }
    }
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            layout: StorageLayout::default(),
            cloudflare: CloudflareSettings::default(),
            api_token: None,
            dns_ttl: Settings::default().dns_ttl,
            launch: LaunchOptions::default(),
            show_progress: true,
        }
    }
}

/// Outcome of a successful deploy
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub target: String,
    pub env_vars: usize,
    pub dns: EnsuredRecord,
    pub record: DeploymentRecord,
    pub state: DeployState,
}

/// Sequences the deploy stages for one target
pub struct Orchestrator {
    registry: TargetRegistry,
    options: OrchestratorOptions,
    dns_provider: Option<Arc<dyn DnsProvider>>,
}

impl Orchestrator {
    pub fn new(registry: TargetRegistry, options: OrchestratorOptions) -> Self {
        Self {
            registry,
            options,
            dns_provider: None,
        }
    }

    /// Use `provider` for every target instead of the one named by its tag
    pub fn with_dns_provider(mut self, provider: Arc<dyn DnsProvider>) -> Self {
        self.dns_provider = Some(provider);
        self
    }

    /// Deploy the target called `name`
    pub async fn deploy(&self, name: &str) -> Result<DeployReport, RoadError> {
        let mut fsm = DeployFsm::new();
        advance(&mut fsm, DeployEvent::Begin)?;

        // Resolve target
        let target = check(&mut fsm, self.registry.get(name))?;
        info!("Deploying {} to {} on port {}", target.repo, target.domain, target.port);
        self.complete(&mut fsm, format!("{} ({})", target.repo, target.runtime))?;

        // Load env
        let env_file = File::new(self.options.layout.resolve(&target.env_file));
        let env = check(&mut fsm, load_env_file(&env_file).await)?;
        self.complete(
            &mut fsm,
            format!("{} variables from {}", env.len(), target.env_file),
        )?;

        // Reconcile DNS
        let (dns, dns_target) = check(&mut fsm, self.reconcile_dns(target, &env).await)?;
        self.complete(
            &mut fsm,
            format!("{} {} (record {})", dns.action, dns_target, dns.record_id),
        )?;

        // Record audit entry
        let journal = AuditJournal::new(
            File::new(self.options.layout.resolve(&target.memory.journal)),
            self.options.layout.genesis_file(),
        );
        let request = DeployRequest::new(target, dns_target);
        let record = check(&mut fsm, journal.record_deployment(&request).await)?;
        self.complete(
            &mut fsm,
            format!("{} -> {}", short_id(&record.id), target.memory.journal),
        )?;

        // Launch entry process
        let launcher = ProcessLauncher::new(self.options.launch.clone());
        check(
            &mut fsm,
            launcher.run(&target.entry, target.port, &env).await,
        )?;
        self.complete(&mut fsm, format!("{} exited cleanly", target.entry))?;

        info!("Deploy of {} succeeded", target.repo);
        Ok(DeployReport {
            target: target.repo.clone(),
            env_vars: env.len(),
            dns,
            record,
            state: fsm.state().clone(),
        })
    }

    async fn reconcile_dns(
        &self,
        target: &DeploymentTarget,
        env: &HashMap<String, String>,
    ) -> Result<(EnsuredRecord, String), RoadError> {
        let provider = match &self.dns_provider {
            Some(provider) => provider.clone(),
            None => provider_for(
                &target.dns,
                &self.options.cloudflare.base_url,
                self.options.api_token.as_ref(),
            )?,
        };

        let config = resolve_target_ip(&target.dns, env);
        let dns_target = config.to_string();
        let reconciler = DnsReconciler::new(provider, self.options.dns_ttl);
        let ensured = reconciler.ensure_record(&config).await?;
        Ok((ensured, dns_target))
    }

    fn complete(&self, fsm: &mut DeployFsm, detail: impl Display) -> Result<(), RoadError> {
        if let (Some(stage), true) = (fsm.current_stage(), self.options.show_progress) {
            println!("{} {:<6} {}", "✓".green(), stage.label().bold(), detail);
        }
        advance(fsm, DeployEvent::StageDone)
    }
}

/// Fill in the A record content from `TARGET_IP` when the target has none
pub fn resolve_target_ip(dns: &DnsConfig, env: &HashMap<String, String>) -> DnsConfig {
    let mut config = dns.clone();
    if config.target_ip.as_deref().map_or(true, |ip| ip.trim().is_empty()) {
        config.target_ip = env
            .get(TARGET_IP_ENV)
            .cloned()
            .or_else(|| std::env::var(TARGET_IP_ENV).ok())
            .filter(|ip| !ip.trim().is_empty());
    }
    config
}

fn advance(fsm: &mut DeployFsm, event: DeployEvent) -> Result<(), RoadError> {
    fsm.process(event).map_err(RoadError::Internal)
}

fn check<T>(fsm: &mut DeployFsm, result: Result<T, RoadError>) -> Result<T, RoadError> {
    result.map_err(|e| {
        let stage = fsm.current_stage();
        if fsm.process(DeployEvent::StageFailed(e.to_string())).is_ok() {
            if let Some(stage) = stage {
                error!(
                    stage = %stage,
                    completed = fsm.completed().len(),
                    "Deploy aborted: {}",
                    e
                );
            }
        }
        e
    })
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns(ip: Option<&str>) -> DnsConfig {
        DnsConfig {
            provider: "memory".to_string(),
            zone: "blackroad.systems".to_string(),
            record_name: "web".to_string(),
            target_ip: ip.map(str::to_string),
        }
    }

    #[test]
    fn test_configured_ip_wins() {
        let env = HashMap::from([(TARGET_IP_ENV.to_string(), "9.9.9.9".to_string())]);
        let config = resolve_target_ip(&dns(Some("5.6.7.8")), &env);
        assert_eq!(config.target_ip.as_deref(), Some("5.6.7.8"));
    }

    #[test]
    fn test_env_map_ip_fallback() {
        let env = HashMap::from([(TARGET_IP_ENV.to_string(), "9.9.9.9".to_string())]);
        let config = resolve_target_ip(&dns(None), &env);
        assert_eq!(config.target_ip.as_deref(), Some("9.9.9.9"));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "0123456789ab");
        assert_eq!(short_id("abc"), "abc");
    }
}
