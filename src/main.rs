//! Tether - redirect assistant tools to a remote host over SSH

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tether::app::protocol::{update_responses, Request, Response};
use tether::app::Tether;
use tether::session::{default_session_path, FileSessionLog, MemorySessionLog, SessionLog};
use tether::shell::SystemExecutor;
use tether::tools::{LocalTools, ToolCall};
use tether::types::config::{parse_port, parse_timeout, validate_host, LaunchOptions};

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(about = "Tether - run assistant tools on a remote host over SSH")]
#[command(version)]
struct Args {
    /// Remote host (user@hostname). Without it, tools run locally.
    #[arg(long = "ssh", value_name = "HOST", env = "TETHER_SSH", value_parser = host_arg)]
    ssh: Option<String>,

    /// Remote working directory
    #[arg(long = "ssh-cwd", value_name = "PATH")]
    ssh_cwd: Option<String>,

    /// SSH port (1-65535)
    #[arg(long = "ssh-port", value_name = "PORT", value_parser = port_arg)]
    ssh_port: Option<u16>,

    /// Custom ssh invocation, e.g. "ssh -o ProxyJump=bastion"
    #[arg(long = "ssh-command", value_name = "COMMAND")]
    ssh_command: Option<String>,

    /// Default timeout for remote commands, in seconds
    #[arg(long = "ssh-timeout", value_name = "SECONDS", value_parser = timeout_arg)]
    ssh_timeout: Option<u64>,

    /// Do not mount the remote directory with sshfs
    #[arg(long = "ssh-no-mount")]
    ssh_no_mount: bool,

    /// Require known host keys when mounting
    #[arg(long = "ssh-strict-host-key")]
    ssh_strict_host_key: bool,

    /// Session log file (default: under the user data directory)
    #[arg(long, value_name = "FILE")]
    session: Option<PathBuf>,

    /// Working directory for local tools
    #[arg(short = 'C', long, default_value = ".")]
    directory: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn host_arg(value: &str) -> Result<String, String> {
    validate_host(value).map(str::to_string).map_err(|e| e.to_string())
}

fn port_arg(value: &str) -> Result<u16, String> {
    parse_port(value).map_err(|e| e.to_string())
}

fn timeout_arg(value: &str) -> Result<u64, String> {
    parse_timeout(value).map_err(|e| e.to_string())
}

impl Args {
    fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            host: self.ssh.clone(),
            remote_cwd: self.ssh_cwd.clone(),
            port: self.ssh_port,
            command: self.ssh_command.clone(),
            timeout: self.ssh_timeout,
            no_mount: self.ssh_no_mount,
            strict_host_key: self.ssh_strict_host_key,
        }
    }
}

/// Maps a stdin read to the next request line. A read error ends input
/// like EOF does, so shutdown still unmounts.
fn stdin_line(line: std::io::Result<Option<String>>) -> Option<String> {
    match line {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "Failed to read stdin, shutting down");
            None
        }
    }
}

fn session_log(path: Option<PathBuf>) -> Arc<dyn SessionLog> {
    match path.map_or_else(default_session_path, Ok) {
        Ok(path) => Arc::new(FileSessionLog::new(path)),
        Err(e) => {
            warn!(error = %e, "No session log path, SSH config will not be persisted");
            Arc::new(MemorySessionLog::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr.
    let filter = if args.debug { "tether=debug" } else { "tether=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let working_dir = args
        .directory
        .canonicalize()
        .with_context(|| format!("Invalid working directory: {}", args.directory.display()))?;

    let executor = Arc::new(SystemExecutor::new());
    let app = Arc::new(Tether::new(
        args.launch_options(),
        executor.clone(),
        Arc::new(LocalTools::new(working_dir).with_executor(executor)),
        session_log(args.session.clone()),
    ));

    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = rx.recv().await {
            let mut line = serde_json::to_string(&response)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        anyhow::Ok(())
    });

    let send = |responses: Vec<Response>| {
        for response in responses {
            // The writer only stops once every sender is gone.
            let _ = tx.send(response);
        }
    };

    send(update_responses(app.start_session().await));

    let pending: Arc<Mutex<HashMap<String, CancellationToken>>> = Arc::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => stdin_line(line),
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                None
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<Request>(&line) {
            Ok(request) => request,
            Err(e) => {
                send(vec![Response::Error {
                    message: format!("Invalid request: {e}"),
                }]);
                continue;
            }
        };

        match request {
            Request::Tool { id, name, input } => {
                let token = CancellationToken::new();
                if let Ok(mut pending) = pending.lock() {
                    pending.insert(id.clone(), token.clone());
                }
                let app = Arc::clone(&app);
                let pending = Arc::clone(&pending);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = app.execute_tool(&ToolCall::new(name, input), Some(token)).await;
                    if let Ok(mut pending) = pending.lock() {
                        pending.remove(&id);
                    }
                    let _ = tx.send(Response::ToolResult { id, result });
                });
            }
            Request::Cancel { id } => {
                if let Some(token) = pending.lock().ok().and_then(|p| p.get(&id).cloned()) {
                    token.cancel();
                }
            }
            Request::Command { text } => send(update_responses(app.handle_command(&text).await)),
            Request::Status => send(vec![Response::Status {
                line: app.state().render_status_line().await,
            }]),
            Request::Definitions => send(vec![Response::Definitions {
                tools: app.tool_definitions(),
            }]),
            Request::Shutdown => break,
        }
    }

    if let Ok(pending) = pending.lock() {
        for token in pending.values() {
            token.cancel();
        }
    }

    send(app.shutdown().await.notifications.into_iter().map(Response::Notification).collect());
    drop(send);
    drop(tx);
    writer.await??;
    Ok(())
}
