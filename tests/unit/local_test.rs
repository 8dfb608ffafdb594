//! Built-in local tools behind the dispatcher.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

use crate::common::{RecordingExecutor, TestContext};
use tether::remote::RemoteState;
use tether::tools::{LocalTools, RemoteTools, ToolCall};

fn local_dispatcher(ctx: &TestContext) -> RemoteTools {
    RemoteTools::new(
        RemoteState::new(),
        RecordingExecutor::new(),
        Arc::new(LocalTools::new(ctx.path())),
    )
}

#[tokio::test]
async fn test_write_edit_read_cycle() {
    let ctx = TestContext::new();
    let tools = local_dispatcher(&ctx);

    let written = tools
        .execute(
            &ToolCall::new("write", json!({"path": "pkg/lib.rs", "content": "pub fn a() {}\n"})),
            None,
        )
        .await;
    assert_eq!(written.text_content(), "Successfully wrote 14 bytes to pkg/lib.rs");
    assert_eq!(written.details["remote"], json!(false));

    let edited = tools
        .execute(
            &ToolCall::new(
                "edit",
                json!({"path": "pkg/lib.rs", "oldText": "fn a", "newText": "fn b"}),
            ),
            None,
        )
        .await;
    assert!(!edited.is_error, "{}", edited.text_content());

    let read = tools
        .execute(&ToolCall::new("read", json!({"path": "pkg/lib.rs"})), None)
        .await;
    assert_eq!(read.text_content(), "pub fn b() {}\n");
}

#[tokio::test]
async fn test_local_ls_and_find() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(ctx.path().join("src")).unwrap();
    std::fs::write(ctx.path().join("src/main.rs"), "fn main() {}\n").unwrap();
    std::fs::write(ctx.path().join("README.md"), "# demo\n").unwrap();
    let tools = local_dispatcher(&ctx);

    let listed = tools.execute(&ToolCall::new("ls", json!({})), None).await;
    assert_eq!(listed.text_content(), "README.md\nsrc/");

    let found = tools
        .execute(&ToolCall::new("find", json!({"pattern": "*.rs"})), None)
        .await;
    assert_eq!(found.text_content(), "src/main.rs");
}

#[tokio::test]
async fn test_local_grep_literal() {
    let ctx = TestContext::new();
    std::fs::write(ctx.path().join("a.txt"), "one\nx.y\nthree\n").unwrap();
    let tools = local_dispatcher(&ctx);

    let result = tools
        .execute(&ToolCall::new("grep", json!({"pattern": "x.y", "literal": true})), None)
        .await;

    assert_eq!(result.text_content(), "a.txt:2:x.y");
    assert_eq!(result.details["matches"], json!(1));
}
