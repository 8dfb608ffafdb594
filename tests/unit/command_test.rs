//! Quoting and ssh invocation building.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use tether::error::TetherError;
use tether::remote::command::{build_invocation, build_remote_invocation};
use tether::remote::quote::{quote, quote_path};
use tether::types::config::{parse_port, parse_timeout, RemoteTargetConfig};

#[test]
fn test_quote_embedded_single_quote() {
    assert_eq!(quote("don't"), r"'don'\''t'");
    assert_eq!(quote(""), "''");
}

#[test]
fn test_quote_path_rejects_line_breaks() {
    assert!(matches!(quote_path("a\rb"), Err(TetherError::UnsafePath { .. })));
    assert!(matches!(quote_path("a\0b"), Err(TetherError::UnsafePath { .. })));
    assert_eq!(quote_path("with space").unwrap(), "'with space'");
}

#[test]
fn test_invocation_without_host_fails() {
    let err = build_invocation(&RemoteTargetConfig::default(), "ls").unwrap_err();
    assert!(matches!(err, TetherError::InvalidCommand { .. }));
}

#[test]
fn test_quoted_operator_is_allowed() {
    let mut config = RemoteTargetConfig::with_host("h");
    config.command = Some(r#"ssh -o "ProxyCommand=nc -X connect -x proxy:8080 %h %p | cat""#.to_string());
    let argv = build_remote_invocation(&config).unwrap();
    assert_eq!(argv.len(), 4);
    assert!(argv[2].ends_with("| cat"));
}

#[test]
fn test_each_unquoted_operator_rejected() {
    for op in ["&&", "||", ";", "|", ">", "<", "&"] {
        let mut config = RemoteTargetConfig::with_host("h");
        config.command = Some(format!("ssh -v {op} x"));
        let err = build_remote_invocation(&config).unwrap_err();
        match err {
            TetherError::DisallowedOperator { operator, .. } => assert_eq!(operator, op),
            other => panic!("unexpected error for {op}: {other}"),
        }
    }
}

#[test]
fn test_unbalanced_quotes_rejected() {
    let mut config = RemoteTargetConfig::with_host("h");
    config.command = Some("ssh -o \"ProxyJump=b".to_string());
    assert!(matches!(
        build_remote_invocation(&config),
        Err(TetherError::InvalidCommand { .. })
    ));
}

#[test]
fn test_timeout_must_be_positive() {
    assert_eq!(parse_timeout("30").unwrap(), 30);
    assert!(parse_timeout("0").is_err());
    assert!(parse_timeout("-4").is_err());
    assert!(parse_timeout("soon").is_err());
}

proptest! {
    #[test]
    fn prop_quote_round_trips_through_shell_words(value in "[^\\x00]{0,40}") {
        let parsed = shell_words::split(&quote(&value)).unwrap();
        prop_assert_eq!(parsed, vec![value]);
    }

    #[test]
    fn prop_port_range(port in 0u32..100_000) {
        let parsed = parse_port(&port.to_string());
        prop_assert_eq!(parsed.is_ok(), (1..=65_535).contains(&port));
    }
}
