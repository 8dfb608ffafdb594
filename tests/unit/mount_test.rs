//! sshfs mount lifecycle.
//!
//! These tests change the process working directory, so they run serially.

use pretty_assertions::assert_eq;
use serial_test::serial;
use std::path::PathBuf;

use crate::common::{RecordingExecutor, TestContext};
use tether::mount::MountManager;
use tether::types::config::RemoteTargetConfig;

fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

fn target() -> RemoteTargetConfig {
    let mut config = RemoteTargetConfig::with_host("dev@box");
    config.remote_cwd = Some("/srv/app".to_string());
    config
}

#[tokio::test]
#[serial]
async fn test_mount_enters_and_unmount_restores_cwd() {
    let ctx = TestContext::new();
    let executor = RecordingExecutor::new();
    let manager = MountManager::new(executor.clone(), false)
        .with_platform("linux")
        .with_temp_root(ctx.path());
    let before = canonical(std::env::current_dir().unwrap());

    let mount_point = manager.mount(&target()).await.unwrap();

    assert!(mount_point.starts_with(ctx.path()));
    assert!(mount_point
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("tether-"));
    assert_eq!(canonical(std::env::current_dir().unwrap()), canonical(mount_point.clone()));
    let sshfs = &executor.calls()[0];
    assert_eq!(sshfs.program, "sshfs");
    assert_eq!(sshfs.args[0], "dev@box:/srv/app");

    assert!(manager.unmount().await.unwrap());

    assert_eq!(canonical(std::env::current_dir().unwrap()), before);
    assert!(!mount_point.exists());
    let calls = executor.calls();
    assert_eq!(calls[1].program, "fusermount");
    assert_eq!(calls[1].args[0], "-u");
}

#[tokio::test]
#[serial]
async fn test_mount_is_idempotent() {
    let ctx = TestContext::new();
    let executor = RecordingExecutor::new();
    let manager = MountManager::new(executor.clone(), false).with_temp_root(ctx.path());
    let before = std::env::current_dir().unwrap();

    let first = manager.mount(&target()).await.unwrap();
    let second = manager.mount(&target()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(executor.calls().len(), 1);
    manager.unmount().await.unwrap();
    std::env::set_current_dir(before).unwrap();
}

#[tokio::test]
#[serial]
async fn test_failed_mount_cleans_up() {
    let ctx = TestContext::new();
    let executor = RecordingExecutor::new();
    executor.push_stderr("connection refused", 1);
    let manager = MountManager::new(executor.clone(), false).with_temp_root(ctx.path());
    let before = std::env::current_dir().unwrap();

    let err = manager.mount(&target()).await.unwrap_err();

    assert!(err.to_string().contains("connection refused"));
    assert_eq!(std::env::current_dir().unwrap(), before);
    assert_eq!(std::fs::read_dir(ctx.path()).unwrap().count(), 0);
    assert_eq!(manager.mount_point().await, None);
}

#[tokio::test]
#[serial]
async fn test_unmount_falls_back_to_umount() {
    let ctx = TestContext::new();
    let executor = RecordingExecutor::new();
    executor.push_output("", 0);
    executor.push_stderr("fusermount: not found", 127);
    let manager = MountManager::new(executor.clone(), false)
        .with_platform("linux")
        .with_temp_root(ctx.path());
    let before = std::env::current_dir().unwrap();

    manager.mount(&target()).await.unwrap();
    assert!(manager.unmount().await.unwrap());

    let programs: Vec<String> = executor.calls().into_iter().map(|c| c.program).collect();
    assert_eq!(programs, vec!["sshfs", "fusermount", "umount"]);
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[tokio::test]
#[serial]
async fn test_unmount_without_mount() {
    let manager = MountManager::new(RecordingExecutor::new(), false);
    assert!(!manager.unmount().await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_strict_host_key_omits_accept_new() {
    let ctx = TestContext::new();
    let executor = RecordingExecutor::new();
    let manager = MountManager::new(executor.clone(), true).with_temp_root(ctx.path());
    let before = std::env::current_dir().unwrap();

    manager.mount(&target()).await.unwrap();
    manager.unmount().await.unwrap();
    std::env::set_current_dir(before).unwrap();

    let sshfs = &executor.calls()[0];
    assert!(!sshfs.args.iter().any(|a| a.contains("StrictHostKeyChecking")));
}
