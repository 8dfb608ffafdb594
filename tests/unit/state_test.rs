//! Shared remote state and capability caching.

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::RecordingExecutor;
use tether::remote::capabilities::{detect, PROBE_COMMAND};
use tether::remote::{RemoteState, CONFIG_ENTRY_TYPE};
use tether::session::SessionEntry;
use tether::types::config::RemoteTargetConfig;

#[tokio::test]
async fn test_detect_without_host_runs_nothing() {
    let executor = RecordingExecutor::new();
    let caps = detect(&RemoteState::new(), executor.as_ref(), None).await;

    assert!(!caps.has_rg && !caps.has_fd);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_detect_caches_per_host() {
    let executor = RecordingExecutor::new();
    executor.push_output("HAS_RG\nHAS_FD\n", 0);
    let state = RemoteState::with_config(RemoteTargetConfig::with_host("a@box"));

    let first = detect(&state, executor.as_ref(), None).await;
    let second = detect(&state, executor.as_ref(), None).await;

    assert_eq!(first, second);
    assert!(first.has_rg && first.has_fd);
    assert_eq!(executor.commands(), vec![PROBE_COMMAND.to_string()]);
}

#[tokio::test]
async fn test_concurrent_detect_runs_one_check() {
    let executor = RecordingExecutor::new();
    executor.push_output("HAS_RG\nHAS_FD\n", 0);
    let state = RemoteState::with_config(RemoteTargetConfig::with_host("a@box"));
    let other = state.clone();

    let (first, second) = tokio::join!(
        detect(&state, executor.as_ref(), None),
        detect(&other, executor.as_ref(), None)
    );

    assert_eq!(executor.commands(), vec![PROBE_COMMAND.to_string()]);
    assert!(first.has_rg && first.has_fd);
    assert!(second.has_rg && second.has_fd);
}

#[tokio::test]
async fn test_port_change_keeps_cache() {
    let executor = RecordingExecutor::new();
    executor.push_output("HAS_RG\n", 0);
    let state = RemoteState::with_config(RemoteTargetConfig::with_host("a@box"));

    detect(&state, executor.as_ref(), None).await;
    state.set_port(Some(2222)).await;
    let caps = detect(&state, executor.as_ref(), None).await;

    assert!(caps.has_rg);
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_replace_discards_cache() {
    let executor = RecordingExecutor::new();
    executor.push_output("HAS_RG\n", 0);
    executor.push_output("", 0);
    let state = RemoteState::with_config(RemoteTargetConfig::with_host("a@box"));

    detect(&state, executor.as_ref(), None).await;
    state.replace(RemoteTargetConfig::with_host("a@box")).await;
    let caps = detect(&state, executor.as_ref(), None).await;

    assert!(!caps.has_rg);
    assert_eq!(executor.calls().len(), 2);
}

#[tokio::test]
async fn test_nonzero_probe_reports_error() {
    let executor = RecordingExecutor::new();
    executor.push_stderr("Permission denied (publickey)", 255);
    let state = RemoteState::with_config(RemoteTargetConfig::with_host("a@box"));

    let caps = detect(&state, executor.as_ref(), None).await;

    assert!(!caps.has_rg && !caps.has_fd);
    let message = caps.probe_error.unwrap();
    assert!(message.contains("255"));
    assert!(message.contains("Permission denied"));
}

#[tokio::test]
async fn test_clones_share_state() {
    let state = RemoteState::new();
    let handle = state.clone();

    handle.set_host(Some("shared@box".to_string())).await;
    handle.set_timeout(Some(10)).await;

    assert_eq!(state.host().await.as_deref(), Some("shared@box"));
    assert_eq!(state.render_status_line().await.as_deref(), Some("SSH: shared@box timeout 10s"));
}

#[tokio::test]
async fn test_empty_host_means_disabled() {
    let state = RemoteState::new();
    state.set_host(Some(String::new())).await;

    assert_eq!(state.host().await, None);
    assert_eq!(state.render_status_line().await, None);
}

#[tokio::test]
async fn test_restore_drops_out_of_range_values() {
    let state = RemoteState::new();
    let entries = vec![SessionEntry::custom(
        CONFIG_ENTRY_TYPE,
        json!({"host": "a@box", "port": 0, "timeout": 0, "remoteCwd": "/srv"}),
    )];

    assert!(state.restore_from_branch(&entries).await);

    let config = state.snapshot().await;
    assert_eq!(config.host.as_deref(), Some("a@box"));
    assert_eq!(config.port, None);
    assert_eq!(config.timeout, None);
    assert_eq!(config.remote_cwd.as_deref(), Some("/srv"));
}

#[tokio::test]
async fn test_restore_drops_option_like_host() {
    let state = RemoteState::new();
    let entries = vec![SessionEntry::custom(
        CONFIG_ENTRY_TYPE,
        json!({"host": "-oProxyCommand=touch /tmp/x"}),
    )];

    state.restore_from_branch(&entries).await;

    assert_eq!(state.host().await, None);
}
