//! End-to-end deploy tests

use std::sync::Arc;

use roadctl::deploy::fsm::DeployState;
use roadctl::deploy::orchestrator::Orchestrator;
use roadctl::dns::memory::InMemoryDnsProvider;
use roadctl::dns::UpsertAction;
use roadctl::errors::RoadError;
use roadctl::targets::registry::TargetRegistry;

mod common;

fn memory_provider() -> Arc<InMemoryDnsProvider> {
    Arc::new(InMemoryDnsProvider::with_zones([common::ZONE]))
}

#[tokio::test]
async fn test_unknown_target_has_no_side_effects() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = memory_provider();
    let registry = TargetRegistry::from_targets([common::web_target("node server.js")]);
    let orchestrator = Orchestrator::new(registry, common::options_in(tmp.path(), true))
        .with_dns_provider(provider.clone());

    let err = orchestrator.deploy("unknown-target").await.unwrap_err();

    match err {
        RoadError::ConfigError(msg) => assert!(msg.contains("blackroad-web")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(provider.calls().total(), 0);
    assert!(!tmp.path().join("memory").exists());
}

#[tokio::test]
async fn test_missing_token_aborts_before_audit() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = TargetRegistry::from_targets([common::web_target("node server.js")]);
    // Cloudflare provider, no token, no override
    let orchestrator = Orchestrator::new(registry, common::options_in(tmp.path(), true));

    let err = orchestrator.deploy("blackroad-web").await.unwrap_err();

    assert!(matches!(err, RoadError::DnsError(ref msg) if msg.contains("CLOUDFLARE_API_TOKEN")));
    assert!(!tmp.path().join("memory").join("journal.json").exists());
    assert!(!tmp
        .path()
        .join("memory")
        .join("snapshots")
        .join("genesis.json")
        .exists());
}

#[tokio::test]
async fn test_dry_run_deploy_records_and_reconciles() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join(".env"), "# web\nROADCTL_IT_DRY_RUN=1\n").unwrap();
    let provider = memory_provider();
    let registry = TargetRegistry::from_targets([common::web_target("/not/spawned")]);
    let orchestrator = Orchestrator::new(registry, common::options_in(tmp.path(), true))
        .with_dns_provider(provider.clone());

    let report = orchestrator.deploy("blackroad-web").await.unwrap();

    assert_eq!(report.state, DeployState::Succeeded);
    assert_eq!(report.env_vars, 1);
    assert_eq!(report.dns.fqdn, "web.blackroad.systems");
    assert_eq!(
        report.record.dns_target,
        "cloudflare:web.blackroad.systems -> 5.6.7.8"
    );

    let journal = common::read_json(&tmp.path().join("memory").join("journal.json"));
    assert_eq!(journal["entries"].as_array().unwrap().len(), 1);
    assert_eq!(journal["entries"][0]["id"], report.record.id.as_str());

    let snapshot = common::read_json(
        &tmp.path().join("memory").join("snapshots").join("genesis.json"),
    );
    assert_eq!(snapshot["record"]["id"], report.record.id.as_str());
}

#[tokio::test]
async fn test_second_deploy_reuses_dns_record_and_appends() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = memory_provider();
    let registry = TargetRegistry::from_targets([common::web_target("/not/spawned")]);
    let orchestrator = Orchestrator::new(registry, common::options_in(tmp.path(), true))
        .with_dns_provider(provider.clone());

    let first = orchestrator.deploy("blackroad-web").await.unwrap();
    let second = orchestrator.deploy("blackroad-web").await.unwrap();

    assert_eq!(first.dns.record_id, second.dns.record_id);
    assert_eq!(provider.records_named("web.blackroad.systems").await.len(), 1);

    let journal = common::read_json(&tmp.path().join("memory").join("journal.json"));
    assert_eq!(journal["entries"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_memory_provider_tag_deploys_without_override() {
    let tmp = tempfile::tempdir().unwrap();
    let mut target = common::web_target("/not/spawned");
    target.dns.provider = "memory".to_string();
    let registry = TargetRegistry::from_targets([target]);
    let orchestrator = Orchestrator::new(registry, common::options_in(tmp.path(), true));

    let report = orchestrator.deploy("blackroad-web").await.unwrap();

    assert_eq!(report.state, DeployState::Succeeded);
    assert_eq!(report.dns.action, UpsertAction::Created);
    assert_eq!(
        report.record.dns_target,
        "memory:web.blackroad.systems -> 5.6.7.8"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_failed_launch_keeps_dns_and_journal() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = memory_provider();
    let registry = TargetRegistry::from_targets([common::web_target("exit 3;")]);
    let orchestrator = Orchestrator::new(registry, common::options_in(tmp.path(), false))
        .with_dns_provider(provider.clone());

    let err = orchestrator.deploy("blackroad-web").await.unwrap_err();

    assert!(matches!(err, RoadError::ProcessExitError { code: 3 }));
    assert_eq!(provider.records_named("web.blackroad.systems").await.len(), 1);
    let journal = common::read_json(&tmp.path().join("memory").join("journal.json"));
    assert_eq!(journal["entries"].as_array().unwrap().len(), 1);
}
