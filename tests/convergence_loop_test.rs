//! Convergence loop behaviour against scripted host ports.

mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use common::{app_document, fast_settings, Harness, ScriptedRegistry, TableStore, PACKAGE_ID};
use install_agent::domain::errors::RegistryError;
use install_agent::domain::models::{
    DisabledReason, InstallCapability, IntentData, LoopOutcome, LoopState, PACKAGE_ARCHIVE_MIME,
};
use install_agent::LoopSettings;

#[tokio::test]
async fn test_installs_twice_then_launches_once() {
    let harness = Harness::new(
        TableStore::new(app_document()),
        ScriptedRegistry::new(vec![Ok(false), Ok(false), Ok(true)]),
        InstallCapability::Scoped,
    );
    let agent = harness.build(fast_settings());

    let report = agent.run().await;

    assert_eq!(report.outcome, LoopOutcome::Converged);
    assert_eq!(report.package_id, PACKAGE_ID);
    assert_eq!(report.attempts, 2);
    assert!(report.launched);
    assert_eq!(agent.state().await, LoopState::Converged);

    assert_eq!(harness.queries(), 3);
    // The second attempt finds the artifact from the first one
    assert_eq!(harness.submissions(), 1);
    assert_eq!(harness.launcher.views().len(), 2);

    let launches = harness.launcher.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].package_id, PACKAGE_ID);
    assert_eq!(launches[0].entry_point, "com.example.app/.MainActivity");

    assert_eq!(harness.releases(), 1);
    assert!(harness.ctx.is_released());
}

#[tokio::test]
async fn test_disabled_document_has_no_side_effects() {
    let mut document = app_document();
    document["enabled"] = json!(false);
    let harness = Harness::new(
        TableStore::new(document),
        ScriptedRegistry::new(vec![Ok(false)]),
        InstallCapability::Scoped,
    );

    let report = harness.build(fast_settings()).run().await;

    assert_eq!(
        report.outcome,
        LoopOutcome::Disabled(DisabledReason::RemoteSwitchOff)
    );
    assert_eq!(report.attempts, 0);
    assert_eq!(harness.queries(), 0);
    assert_eq!(harness.submissions(), 0);
    assert!(harness.launcher.views().is_empty());
    assert!(harness.launcher.launches().is_empty());
    assert_eq!(harness.releases(), 1);
}

#[tokio::test]
async fn test_missing_enabled_key_disables() {
    let harness = Harness::new(
        TableStore::new(json!({ "package_name": PACKAGE_ID, "name": "App", "url": "https://host/app.pkg" })),
        ScriptedRegistry::new(vec![]),
        InstallCapability::Scoped,
    );

    let report = harness.build(fast_settings()).run().await;

    assert_eq!(
        report.outcome,
        LoopOutcome::Disabled(DisabledReason::RemoteSwitchOff)
    );
    assert_eq!(harness.queries(), 0);
}

#[tokio::test]
async fn test_cancelled_enabled_read_never_starts_loop() {
    let harness = Harness::new(
        TableStore::new(app_document()).hanging_on("enabled"),
        ScriptedRegistry::new(vec![Ok(false)]),
        InstallCapability::Scoped,
    );
    let agent = harness.build(fast_settings());

    let ctx = Arc::clone(&harness.ctx);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), agent.run())
        .await
        .expect("loop should stop once cancelled");

    assert_eq!(report.outcome, LoopOutcome::Cancelled);
    assert_eq!(agent.state().await, LoopState::Cancelled);
    assert_eq!(harness.queries(), 0);
    assert_eq!(harness.submissions(), 0);
    assert!(harness.launcher.views().is_empty());
    assert!(harness.launcher.launches().is_empty());
    assert_eq!(harness.releases(), 1);
}

#[tokio::test]
async fn test_scoped_capability_uses_content_handle() {
    let harness = Harness::new(
        TableStore::new(app_document()),
        ScriptedRegistry::new(vec![Ok(false), Ok(true)]),
        InstallCapability::Scoped,
    );

    harness.build(fast_settings()).run().await;

    let views = harness.launcher.views();
    assert_eq!(views.len(), 1);
    assert_eq!(
        views[0].data,
        IntentData::Content("content://install-agent.provider/App.apk".to_string())
    );
    assert!(views[0].mime_type.is_none());
    assert!(views[0].flags.grant_read_uri);
    assert_eq!(
        harness
            .provider
            .calls
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn test_legacy_capability_sends_file_and_mime() {
    let harness = Harness::new(
        TableStore::new(app_document()),
        ScriptedRegistry::new(vec![Ok(false), Ok(true)]),
        InstallCapability::Legacy,
    );

    harness.build(fast_settings()).run().await;

    let views = harness.launcher.views();
    assert_eq!(views.len(), 1);
    assert_eq!(
        views[0].data,
        IntentData::File("file:///data/agent/downloads/App.apk".to_string())
    );
    assert_eq!(views[0].mime_type.as_deref(), Some(PACKAGE_ARCHIVE_MIME));
    assert!(!views[0].flags.grant_read_uri);
    assert_eq!(
        harness
            .provider
            .calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_strict_config_stops_on_incomplete_document() {
    let harness = Harness::new(
        TableStore::new(json!({ "enabled": true, "name": "App", "url": "https://host/app.pkg" })),
        ScriptedRegistry::new(vec![Ok(false)]),
        InstallCapability::Scoped,
    );
    let settings = LoopSettings {
        strict_config: true,
        ..fast_settings()
    };

    let report = harness.build(settings).run().await;

    assert_eq!(
        report.outcome,
        LoopOutcome::Disabled(DisabledReason::IncompleteConfig(vec![
            "package_name".to_string()
        ]))
    );
    assert_eq!(harness.queries(), 0);
    assert_eq!(harness.submissions(), 0);
    assert_eq!(harness.releases(), 1);
}

#[tokio::test]
async fn test_incomplete_document_keeps_polling_until_cancelled() {
    let harness = Harness::new(
        TableStore::new(json!({ "enabled": true, "name": "App", "url": "https://host/app.pkg" })),
        ScriptedRegistry::new(vec![]),
        InstallCapability::Scoped,
    );
    let agent = harness.build(fast_settings());

    let ctx = Arc::clone(&harness.ctx);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        ctx.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), agent.run())
        .await
        .expect("loop should stop once cancelled");

    assert_eq!(report.outcome, LoopOutcome::Cancelled);
    assert!(report.attempts >= 1);
    // An empty package id is treated as not installed without asking the registry
    assert_eq!(harness.queries(), 0);
    assert!(harness.launcher.launches().is_empty());
    assert_eq!(harness.releases(), 1);
}

#[tokio::test]
async fn test_install_query_failure_is_retried() {
    let harness = Harness::new(
        TableStore::new(app_document()),
        ScriptedRegistry::new(vec![
            Err(RegistryError::Query("registry busy".to_string())),
            Ok(true),
        ]),
        InstallCapability::Scoped,
    );

    let report = harness.build(fast_settings()).run().await;

    assert_eq!(report.outcome, LoopOutcome::Converged);
    assert_eq!(report.install_query_failures, 1);
    assert_eq!(report.attempts, 0);
    assert_eq!(harness.queries(), 2);
    assert_eq!(harness.submissions(), 0);
    assert_eq!(harness.launcher.launches().len(), 1);
}

#[tokio::test]
async fn test_download_failure_skips_install() {
    let artifacts = Arc::new(common::MemoryArtifacts::default());
    let downloads = Arc::new(common::FakeDownloads::failing(Arc::clone(&artifacts)));
    let harness = Harness::with_downloads(
        TableStore::new(app_document()),
        ScriptedRegistry::new(vec![Ok(false), Ok(true)]),
        InstallCapability::Scoped,
        artifacts,
        downloads,
    );

    let report = harness.build(fast_settings()).run().await;

    assert_eq!(report.outcome, LoopOutcome::Converged);
    assert_eq!(report.attempts, 1);
    assert_eq!(report.download_failures, 1);
    assert_eq!(harness.submissions(), 1);
    assert!(harness.launcher.views().is_empty());
}

#[tokio::test]
async fn test_cancellation_interrupts_poll_interval() {
    let harness = Harness::new(
        TableStore::new(app_document()),
        ScriptedRegistry::never_installed(),
        InstallCapability::Scoped,
    );
    let settings = LoopSettings {
        poll_interval: Duration::from_secs(3600),
        ..fast_settings()
    };
    let agent = harness.build(settings);

    let ctx = Arc::clone(&harness.ctx);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), agent.run())
        .await
        .expect("cancellation should cut the wait short");

    assert_eq!(report.outcome, LoopOutcome::Cancelled);
    assert_eq!(report.attempts, 1);
    assert_eq!(harness.queries(), 1);
    assert!(harness.launcher.launches().is_empty());
    assert_eq!(harness.releases(), 1);
}
