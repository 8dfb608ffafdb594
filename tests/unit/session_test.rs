//! Config persistence across sessions.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

use crate::common::{RecordingExecutor, RecordingLocal, TestContext};
use tether::app::Tether;
use tether::remote::CONFIG_ENTRY_TYPE;
use tether::session::{FileSessionLog, SessionEntry, SessionLog};
use tether::types::config::LaunchOptions;

fn app(log: Arc<FileSessionLog>, options: LaunchOptions) -> Tether {
    Tether::new(
        LaunchOptions {
            no_mount: true,
            ..options
        },
        RecordingExecutor::new(),
        RecordingLocal::new(),
        log,
    )
}

#[tokio::test]
async fn test_config_survives_restart() {
    let ctx = TestContext::new();
    let path = ctx.path().join("sessions/main.jsonl");

    let first = app(Arc::new(FileSessionLog::new(&path)), LaunchOptions::default());
    first.start_session().await;
    first.handle_command("/ssh ops@edge /var/www").await;
    first.handle_command("/ssh port 2022").await;

    let second = app(Arc::new(FileSessionLog::new(&path)), LaunchOptions::default());
    let update = second.start_session().await;

    assert_eq!(update.status_line.as_deref(), Some("SSH: ops@edge:2022 [/var/www]"));
    assert_eq!(update.notifications[0].message, "Restored SSH target: ops@edge");
}

#[tokio::test]
async fn test_disable_is_restored_as_disabled() {
    let ctx = TestContext::new();
    let path = ctx.path().join("s.jsonl");

    let first = app(Arc::new(FileSessionLog::new(&path)), LaunchOptions::default());
    first.handle_command("/ssh ops@edge").await;
    first.handle_command("/ssh off").await;

    let second = app(Arc::new(FileSessionLog::new(&path)), LaunchOptions::default());
    let update = second.start_session().await;

    assert_eq!(update.status_line, None);
    assert_eq!(second.state().host().await, None);
}

#[tokio::test]
async fn test_tampered_entry_is_skipped() {
    let ctx = TestContext::new();
    let path = ctx.path().join("s.jsonl");
    let log = FileSessionLog::new(&path);
    log.append(SessionEntry::custom(CONFIG_ENTRY_TYPE, json!({"host": "good@box"})))
        .await
        .unwrap();
    log.append(SessionEntry::custom(CONFIG_ENTRY_TYPE, json!({"host": "evil@box"})))
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = contents.lines().map(String::from).collect();
    lines[1] = lines[1].replace("evil@box", "mallory@box");
    std::fs::write(&path, lines.join("\n")).unwrap();

    let restored = app(Arc::new(FileSessionLog::new(&path)), LaunchOptions::default());
    restored.start_session().await;

    assert_eq!(restored.state().host().await.as_deref(), Some("good@box"));
}

#[tokio::test]
async fn test_other_entries_are_ignored() {
    let ctx = TestContext::new();
    let path = ctx.path().join("s.jsonl");
    let log = FileSessionLog::new(&path);
    log.append(SessionEntry::custom(CONFIG_ENTRY_TYPE, json!({"host": "a@box"})))
        .await
        .unwrap();
    log.append(SessionEntry::custom("bookmark", json!({"host": "b@box"})))
        .await
        .unwrap();

    let restored = app(Arc::new(FileSessionLog::new(&path)), LaunchOptions::default());
    restored.start_session().await;

    assert_eq!(restored.state().host().await.as_deref(), Some("a@box"));
}

#[tokio::test]
async fn test_cli_host_is_persisted() {
    let ctx = TestContext::new();
    let path = ctx.path().join("s.jsonl");
    let options = LaunchOptions {
        host: Some("cli@box".to_string()),
        port: Some(2200),
        ..LaunchOptions::default()
    };

    app(Arc::new(FileSessionLog::new(&path)), options).start_session().await;

    let entries = FileSessionLog::new(&path).entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].data["host"], json!("cli@box"));
    assert_eq!(entries[0].data["port"], json!(2200));
}

#[tokio::test]
async fn test_missing_log_starts_disabled() {
    let ctx = TestContext::new();
    let app = app(
        Arc::new(FileSessionLog::new(ctx.path().join("absent.jsonl"))),
        LaunchOptions::default(),
    );

    let update = app.start_session().await;

    assert!(update.notifications.is_empty());
    assert_eq!(update.status_line, None);
}
