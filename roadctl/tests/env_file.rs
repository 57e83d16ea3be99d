//! Deploys whose env file feeds the entry process and the DNS stage
//!
//! The env loader copies file variables into the process environment, so
//! these tests live in their own binary. Each test uses keys no other test
//! in this binary touches.

use std::sync::Arc;

use roadctl::deploy::fsm::DeployState;
use roadctl::deploy::orchestrator::Orchestrator;
use roadctl::dns::memory::InMemoryDnsProvider;
use roadctl::targets::registry::TargetRegistry;

mod common;

fn memory_provider() -> Arc<InMemoryDnsProvider> {
    Arc::new(InMemoryDnsProvider::with_zones([common::ZONE]))
}

#[tokio::test]
async fn test_target_ip_from_env_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join(".env"), "TARGET_IP=10.1.2.3\n").unwrap();
    let provider = memory_provider();
    let mut target = common::web_target("/not/spawned");
    target.dns.target_ip = None;
    let registry = TargetRegistry::from_targets([target]);
    let orchestrator = Orchestrator::new(registry, common::options_in(tmp.path(), true))
        .with_dns_provider(provider.clone());

    orchestrator.deploy("blackroad-web").await.unwrap();

    let records = provider.records_named("web.blackroad.systems").await;
    assert_eq!(records[0].content, "10.1.2.3");
}

#[cfg(unix)]
#[tokio::test]
async fn test_explicit_port_wins_over_env_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join(".env"), "PORT=9999\nAPI_KEY=xyz\n").unwrap();
    let provider = memory_provider();
    let registry = TargetRegistry::from_targets([common::web_target(
        r#"test "$PORT" = 3100 && test "$API_KEY" = xyz"#,
    )]);
    let orchestrator = Orchestrator::new(registry, common::options_in(tmp.path(), false))
        .with_dns_provider(provider);

    let report = orchestrator.deploy("blackroad-web").await.unwrap();
    assert_eq!(report.state, DeployState::Succeeded);
}
