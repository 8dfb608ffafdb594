//! `/ssh` command handling through the extension entry point.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use crate::common::{RecordingExecutor, RecordingLocal};
use tether::app::Tether;
use tether::commands::NotifyLevel;
use tether::session::{MemorySessionLog, SessionLog};
use tether::types::config::LaunchOptions;

fn app(log: Arc<MemorySessionLog>) -> Tether {
    Tether::new(
        LaunchOptions {
            no_mount: true,
            ..LaunchOptions::default()
        },
        RecordingExecutor::new(),
        RecordingLocal::new(),
        log,
    )
}

#[tokio::test]
async fn test_configure_full_target() {
    let log = Arc::new(MemorySessionLog::new());
    let app = app(Arc::clone(&log));

    app.handle_command("/ssh deploy@prod /srv/app").await;
    app.handle_command("/ssh port 2222").await;
    let update = app.handle_command("/ssh timeout 60").await;

    assert_eq!(
        update.status_line.as_deref(),
        Some("SSH: deploy@prod:2222 [/srv/app] timeout 60s")
    );
    assert_eq!(log.entries().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_queries_do_not_persist() {
    let log = Arc::new(MemorySessionLog::new());
    let app = app(Arc::clone(&log));

    let update = app.handle_command("/ssh port").await;
    app.handle_command("/ssh").await;

    assert_eq!(update.notifications[0].message, "SSH port: (default)");
    assert_eq!(update.status_line, None);
    assert!(log.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_show_lists_every_field() {
    let app = app(Arc::new(MemorySessionLog::new()));
    app.handle_command("/ssh me@box").await;

    let update = app.handle_command("/ssh show").await;
    let message = &update.notifications[0].message;

    assert!(message.contains("Host: me@box"));
    assert!(message.contains("Port: (default)"));
    assert!(message.contains("Timeout: (none)"));
}

#[tokio::test]
async fn test_clear_resets_single_field() {
    let app = app(Arc::new(MemorySessionLog::new()));
    app.handle_command("/ssh me@box").await;
    app.handle_command("/ssh port 2200").await;

    app.handle_command("/ssh port clear").await;

    assert_eq!(app.state().port().await, None);
    assert_eq!(app.state().host().await.as_deref(), Some("me@box"));
}

#[tokio::test]
async fn test_disable_clears_status_line() {
    let log = Arc::new(MemorySessionLog::new());
    let app = app(Arc::clone(&log));
    app.handle_command("/ssh me@box").await;

    let update = app.handle_command("/ssh off").await;

    assert_eq!(update.status_line, None);
    assert_eq!(app.state().host().await, None);
    assert_eq!(log.entries().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_operator_command_rejected_without_change() {
    let log = Arc::new(MemorySessionLog::new());
    let app = app(Arc::clone(&log));

    let update = app.handle_command("/ssh command ssh -J a ; rm").await;

    assert_eq!(update.notifications[0].level, NotifyLevel::Error);
    assert!(update.notifications[0].message.contains("';'"));
    assert_eq!(app.state().command().await, None);
    assert!(log.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_timeout_is_error() {
    let app = app(Arc::new(MemorySessionLog::new()));

    let update = app.handle_command("/ssh timeout 0").await;

    assert_eq!(update.notifications[0].level, NotifyLevel::Error);
    assert!(update.notifications[0].message.starts_with("Invalid timeout '0'"));
}

#[tokio::test]
async fn test_option_like_host_is_refused() {
    let log = Arc::new(MemorySessionLog::new());
    let app = app(log.clone());

    let update = app.handle_command("/ssh -oProxyCommand=touch/tmp/x").await;

    assert_eq!(update.notifications[0].level, NotifyLevel::Error);
    assert!(update.notifications[0].message.starts_with("Invalid SSH host"));
    assert_eq!(app.state().host().await, None);
    assert!(log.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_command_text() {
    let app = app(Arc::new(MemorySessionLog::new()));

    let update = app.handle_command("ssh me@box").await;

    assert_eq!(update.notifications[0].message, "Not a command: ssh me@box");
}
