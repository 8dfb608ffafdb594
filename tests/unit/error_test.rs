//! Error display and tool-result mapping.

use pretty_assertions::assert_eq;

use tether::error::TetherError;
use tether::tools::error_result;

#[test]
fn test_edit_errors_keep_their_text() {
    let result = error_result(&TetherError::EditAmbiguous {
        path: "f.rs".to_string(),
        count: 2,
    });
    assert!(result.is_error);
    assert_eq!(
        result.text_content(),
        "oldText appears 2 times in f.rs. Provide more surrounding context so the match is unique."
    );
}

#[test]
fn test_remote_failure_keeps_stderr_message() {
    let result = error_result(&TetherError::remote_failure(1, "Error reading a: denied"));
    assert_eq!(result.text_content(), "Error reading a: denied");
}

#[test]
fn test_other_errors_are_prefixed() {
    let result = error_result(&TetherError::invalid_port("0"));
    assert_eq!(
        result.text_content(),
        "Error: Invalid port '0': must be an integer between 1 and 65535"
    );
}

#[test]
fn test_configuration_classification() {
    assert!(TetherError::invalid_port("x").is_configuration());
    assert!(TetherError::invalid_timeout("x").is_configuration());
    assert!(!TetherError::exec("boom").is_configuration());
}

#[test]
fn test_module_mapping() {
    assert_eq!(TetherError::mount("x").module(), "mount");
    assert_eq!(TetherError::session("x").module(), "session");
    assert_eq!(TetherError::invalid_input("ls", "bad").module(), "tools");
}
