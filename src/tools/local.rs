//! Local tool implementations.
//!
//! Used whenever no remote host is configured. [`LocalToolProvider`] is the
//! seam an embedding host implements to hand calls to its own built-in tools;
//! [`LocalTools`] is the stand-alone implementation used by the binary.

use async_trait::async_trait;
use glob::Pattern;
use regex::RegexBuilder;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::WalkDir;

use super::bash::{self, BashInput};
use super::edit::{self, EditInput};
use super::find::{self, FindInput};
use super::grep::{self, GrepInput};
use super::ls::{self, LsInput};
use super::read::{self, ReadInput};
use super::truncate::TruncationLimits;
use super::write::{self, WriteInput};
use super::{error_result, parse_input, ToolKind};
use crate::error::{TetherError, TetherResult};
use crate::shell::{ExecOptions, ProcessExecutor, ShellConfig, SystemExecutor};
use crate::types::content::ToolResult;

/// Host-side implementation of the seven tools.
#[async_trait]
pub trait LocalToolProvider: Send + Sync {
    /// Runs `kind` locally. Failures are returned as error results.
    async fn execute(&self, kind: ToolKind, input: &Value, cancel: Option<CancellationToken>) -> ToolResult;
}

/// Runs the tools against the local filesystem and shell.
pub struct LocalTools {
    working_dir: PathBuf,
    shell: ShellConfig,
    executor: Arc<dyn ProcessExecutor>,
    limits: TruncationLimits,
}

impl std::fmt::Debug for LocalTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTools")
            .field("working_dir", &self.working_dir)
            .field("shell", &self.shell)
            .finish_non_exhaustive()
    }
}

impl LocalTools {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            shell: ShellConfig::default(),
            executor: Arc::new(SystemExecutor::new()),
            limits: TruncationLimits::default(),
        }
    }

    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn ProcessExecutor>) -> Self {
        self.executor = executor;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: TruncationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolves `path` against the working directory.
    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    async fn bash(&self, input: &Value, cancel: Option<CancellationToken>) -> TetherResult<ToolResult> {
        let input: BashInput = parse_input(ToolKind::Bash, input)?;
        let options = ExecOptions::default()
            .with_timeout(input.timeout.filter(|t| *t > 0).map(std::time::Duration::from_secs))
            .with_cancel(cancel)
            .with_cwd(&self.working_dir);
        let output = self
            .executor
            .exec(&self.shell.command, &self.shell.argv(&input.command), options)
            .await?;
        Ok(bash::format_output(&output, self.limits))
    }

    async fn read(&self, input: &Value) -> TetherResult<ToolResult> {
        let input: ReadInput = parse_input(ToolKind::Read, input)?;
        let content = tokio::fs::read_to_string(self.resolve(&input.path))
            .await
            .map_err(|e| TetherError::remote_failure(1, format!("Error reading {}: {e}", input.path)))?;

        let skip = input.offset.filter(|o| *o > 0).map_or(0, |o| o - 1);
        let take = input.limit.filter(|l| *l > 0).unwrap_or(usize::MAX);
        let selected: String = content.split_inclusive('\n').skip(skip).take(take).collect();
        Ok(read::format_content(&selected, input.offset, self.limits))
    }

    async fn write(&self, input: &Value) -> TetherResult<ToolResult> {
        let input: WriteInput = parse_input(ToolKind::Write, input)?;
        let path = self.resolve(&input.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &input.content)
            .await
            .map_err(|e| TetherError::remote_failure(1, format!("Error writing {}: {e}", input.path)))?;
        Ok(write::written(&input.path, input.content.len()))
    }

    async fn edit(&self, input: &Value) -> TetherResult<ToolResult> {
        let input: EditInput = parse_input(ToolKind::Edit, input)?;
        let path = self.resolve(&input.path);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| TetherError::remote_failure(1, format!("Error reading {}: {e}", input.path)))?;
        let updated = edit::apply_edit(&input.path, &content, &input.old_text, &input.new_text)?;
        tokio::fs::write(&path, updated).await?;
        Ok(edit::edited(&input.path, &input.old_text, &input.new_text))
    }

    async fn grep(&self, input: &Value) -> TetherResult<ToolResult> {
        let input: GrepInput = parse_input(ToolKind::Grep, input)?;
        let root = self.resolve(input.search_path());
        let limit = input.effective_limit();
        let limits = self.limits;

        let output = tokio::task::spawn_blocking(move || search_files(&root, &input, limit))
            .await
            .map_err(|e| TetherError::exec(format!("Search task failed: {e}")))??;
        Ok(grep::format_matches(&output, limit, limits).with_detail("tool", Value::from("builtin")))
    }

    async fn find(&self, input: &Value) -> TetherResult<ToolResult> {
        let input: FindInput = parse_input(ToolKind::Find, input)?;
        let root = self.resolve(input.search_path());
        let limit = input.effective_limit();
        let limits = self.limits;

        let output = tokio::task::spawn_blocking(move || find_files(&root, &input.pattern, limit))
            .await
            .map_err(|e| TetherError::exec(format!("Find task failed: {e}")))??;
        Ok(find::format_paths(&output, limit, limits))
    }

    async fn ls(&self, input: &Value) -> TetherResult<ToolResult> {
        let input: LsInput = parse_input(ToolKind::Ls, input)?;
        let mut dir = match tokio::fs::read_dir(self.resolve(input.dir())).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TetherError::remote_failure(
                    2,
                    format!("Directory not found: {}", input.dir()),
                ));
            }
            Err(e) => {
                return Err(TetherError::remote_failure(
                    2,
                    format!("Error listing {}: {e}", input.dir()),
                ));
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let mut name = entry.file_name().to_string_lossy().to_string();
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => name.push('/'),
                Ok(_) => {}
                Err(_) => continue,
            }
            entries.push(name);
        }
        entries.sort();

        let names: Vec<&str> = entries.iter().map(String::as_str).collect();
        Ok(ls::format_entries(&names, input.effective_limit(), self.limits))
    }
}

#[async_trait]
impl LocalToolProvider for LocalTools {
    async fn execute(&self, kind: ToolKind, input: &Value, cancel: Option<CancellationToken>) -> ToolResult {
        debug!(tool = %kind, working_dir = %self.working_dir.display(), "Running tool locally");
        let outcome = match kind {
            ToolKind::Bash => self.bash(input, cancel).await,
            ToolKind::Read => self.read(input).await,
            ToolKind::Write => self.write(input).await,
            ToolKind::Edit => self.edit(input).await,
            ToolKind::Grep => self.grep(input).await,
            ToolKind::Find => self.find(input).await,
            ToolKind::Ls => self.ls(input).await,
        };
        outcome.unwrap_or_else(|err| error_result(&err))
    }
}

fn display_path(root: &Path, path: &Path) -> String {
    if root.is_file() {
        return path.to_string_lossy().to_string();
    }
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

fn walk(root: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
}

/// Content search producing `path:line:text` lines (context lines use `-`).
fn search_files(root: &Path, input: &GrepInput, limit: usize) -> TetherResult<String> {
    let pattern = if input.literal {
        regex::escape(&input.pattern)
    } else {
        input.pattern.clone()
    };
    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(input.ignore_case)
        .build()
        .map_err(|e| TetherError::invalid_input(ToolKind::Grep.name(), format!("invalid regex: {e}")))?;
    let file_glob = match &input.glob {
        Some(glob) => Some(
            Pattern::new(glob)
                .map_err(|e| TetherError::invalid_input(ToolKind::Grep.name(), format!("invalid glob: {e}")))?,
        ),
        None => None,
    };
    let context = input.context.unwrap_or(0);

    let mut out: Vec<String> = Vec::new();
    for entry in walk(root) {
        if let Some(glob) = &file_glob {
            if !glob.matches(&entry.file_name().to_string_lossy()) {
                continue;
            }
        }
        // Skip binary and unreadable files.
        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        let name = display_path(root, entry.path());
        let lines: Vec<&str> = content.lines().collect();

        let mut last_printed: Option<usize> = None;
        for (idx, line) in lines.iter().enumerate() {
            if !regex.is_match(line) {
                continue;
            }
            let start = idx.saturating_sub(context);
            let end = (idx + context).min(lines.len().saturating_sub(1));
            for ctx_idx in start..=end {
                if last_printed.is_some_and(|p| ctx_idx <= p) {
                    continue;
                }
                let sep = if ctx_idx == idx || regex.is_match(lines[ctx_idx]) {
                    ':'
                } else {
                    '-'
                };
                out.push(format!("{name}{sep}{}{sep}{}", ctx_idx + 1, lines[ctx_idx]));
                last_printed = Some(ctx_idx);
                if out.len() >= limit {
                    return Ok(out.join("\n"));
                }
            }
        }
    }
    Ok(out.join("\n"))
}

/// Name search: the glob matches the file name, or the relative path when it
/// contains `/`.
fn find_files(root: &Path, pattern: &str, limit: usize) -> TetherResult<String> {
    let glob = Pattern::new(pattern)
        .map_err(|e| TetherError::invalid_input(ToolKind::Find.name(), format!("invalid glob: {e}")))?;
    let match_path = pattern.contains('/');

    let mut matches = Vec::new();
    for entry in walk(root) {
        let relative = display_path(root, entry.path());
        let candidate = if match_path {
            relative.clone()
        } else {
            entry.file_name().to_string_lossy().to_string()
        };
        if glob.matches(&candidate) {
            matches.push(relative);
            if matches.len() >= limit {
                break;
            }
        }
    }
    Ok(matches.join("\n"))
}
