//! Versioning facade over an external git executable.
//!
//! Each operation maps onto one or more tool invocations scoped to the
//! workspace. In disabled mode every operation returns its sentinel without
//! invoking anything.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace, warn, Instrument};

use super::error::VersioningError;
use super::types::{
    BranchName, CommitId, DEFAULT_PROGRAM, DEFAULT_RESERVED_BRANCH, DISABLED_SENTINEL,
    INITIAL_COMMIT_MESSAGE,
};
use crate::config::{VersioningConfig, VersioningMode};
use crate::external::{CommandExecutor, CommandOutput, Invocation};
use crate::telemetry::{create_versioning_span, generate_correlation_id};

pub type VersioningResult<T> = Result<T, VersioningError>;

/// Versioned workspace bound to one working directory.
pub struct WorkspaceVersioning {
    working_dir: PathBuf,
    mode: VersioningMode,
    program: String,
    reserved_branch: String,
    merge_previous_on_ensure: bool,
    executor: Arc<dyn CommandExecutor>,
    correlation_id: String,
    // Written after successful checkouts, never read back as truth.
    last_switched_branch: Mutex<Option<BranchName>>,
}

impl std::fmt::Debug for WorkspaceVersioning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceVersioning")
            .field("working_dir", &self.working_dir)
            .field("mode", &self.mode)
            .field("program", &self.program)
            .field("reserved_branch", &self.reserved_branch)
            .field("merge_previous_on_ensure", &self.merge_previous_on_ensure)
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

impl WorkspaceVersioning {
    pub fn new(
        working_dir: impl Into<PathBuf>,
        mode: VersioningMode,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            mode,
            program: DEFAULT_PROGRAM.to_string(),
            reserved_branch: DEFAULT_RESERVED_BRANCH.to_string(),
            merge_previous_on_ensure: true,
            executor,
            correlation_id: generate_correlation_id(),
            last_switched_branch: Mutex::new(None),
        }
    }

    pub fn from_config(config: &VersioningConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self::new(config.working_dir.clone(), config.mode, executor)
            .with_program(&config.program)
            .with_reserved_branch(&config.reserved_branch)
            .with_previous_branch_merge(config.merge_previous_on_ensure)
    }

    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn with_reserved_branch(mut self, branch: &str) -> Self {
        self.reserved_branch = branch.to_string();
        self
    }

    /// Controls whether `ensure_branch` merges the branch it leaves into the one
    /// it lands on.
    pub fn with_previous_branch_merge(mut self, enabled: bool) -> Self {
        self.merge_previous_on_ensure = enabled;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn mode(&self) -> VersioningMode {
        self.mode
    }

    /// Branch most recently checked out through this facade, if any.
    pub fn last_switched_branch(&self) -> Option<BranchName> {
        self.last_switched_branch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record_switch(&self, branch: &str) {
        *self
            .last_switched_branch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(branch.to_string());
    }

    fn disabled(&self, operation: &str) -> bool {
        if self.mode.is_disabled() {
            trace!(operation, "Versioning disabled, skipping");
            return true;
        }
        false
    }

    fn span(&self, operation: &str) -> tracing::Span {
        create_versioning_span(operation, &self.working_dir, &self.correlation_id)
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation::new(&self.program, args.iter().copied(), &self.working_dir)
    }

    /// Run the tool and hand back its output whatever the exit status.
    async fn run_unchecked(&self, invocation: &Invocation) -> VersioningResult<CommandOutput> {
        Ok(self.executor.execute(invocation).await?)
    }

    /// Run the tool, turning a non-zero exit into `ToolFailed`.
    async fn run_invocation(&self, invocation: Invocation) -> VersioningResult<CommandOutput> {
        let output = self.run_unchecked(&invocation).await?;
        if !output.success() {
            let command = format!("{} {}", invocation.program, invocation.display_args());
            warn!(
                command = %command,
                status_code = output.status_code,
                "External command failed"
            );
            return Err(VersioningError::ToolFailed {
                command,
                status_code: output.status_code,
                diagnostic: output.diagnostic(),
            });
        }
        Ok(output)
    }

    async fn run(&self, args: &[&str]) -> VersioningResult<CommandOutput> {
        self.run_invocation(self.invocation(args)).await
    }

    async fn head_commit(&self) -> VersioningResult<CommitId> {
        let output = self.run(&["rev-parse", "HEAD"]).await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Whether the external tool can be run at all. Never fails.
    pub async fn ensure_tool_available(&self) -> bool {
        if self.disabled("ensure_tool_available") {
            return true;
        }
        let invocation = Invocation::unscoped(&self.program, ["--version"]);
        let probe = self.run_unchecked(&invocation);
        match probe.instrument(self.span("ensure_tool_available")).await {
            Ok(output) if output.success() => true,
            Ok(output) => {
                debug!(status_code = output.status_code, "Version probe exited non-zero");
                false
            }
            Err(e) => {
                debug!(error = %e, "Version probe could not run");
                false
            }
        }
    }

    /// Create a repository in the working directory unless one already covers it.
    pub async fn initialize(&self) -> VersioningResult<()> {
        if self.disabled("initialize") {
            return Ok(());
        }
        if !self.ensure_tool_available().await {
            return Err(VersioningError::ToolNotInstalled {
                program: self.program.clone(),
            });
        }

        async {
            let probe = self
                .run_unchecked(&self.invocation(&["rev-parse", "--is-inside-work-tree"]))
                .await?;
            if probe.success() {
                info!("Workspace is already a repository, skipping initialization");
                return Ok(());
            }

            self.run(&["init"]).await?;
            info!("Repository initialized");
            Ok(())
        }
        .instrument(self.span("initialize"))
        .await
    }

    pub async fn current_branch(&self) -> VersioningResult<BranchName> {
        if self.disabled("current_branch") {
            return Ok(DISABLED_SENTINEL.to_string());
        }
        async {
            let output = self.run(&["branch", "--show-current"]).await?;
            Ok(output.stdout.trim().to_string())
        }
        .instrument(self.span("current_branch"))
        .await
    }

    /// Stage everything and commit it, returning the new commit id.
    pub async fn commit_all(&self, message: &str) -> VersioningResult<CommitId> {
        if self.disabled("commit_all") {
            return Ok(DISABLED_SENTINEL.to_string());
        }
        async {
            self.run(&["add", "."]).await?;
            self.run(&["commit", "-m", message]).await?;
            let commit = self.head_commit().await?;
            info!(commit = %commit, "Committed workspace");
            Ok(commit)
        }
        .instrument(self.span("commit_all"))
        .await
    }

    /// Return the id of the initial commit, creating it when HEAD is not one.
    ///
    /// Calling this twice in a row yields the same id.
    pub async fn ensure_initial_commit(&self) -> VersioningResult<CommitId> {
        if self.disabled("ensure_initial_commit") {
            return Ok(DISABLED_SENTINEL.to_string());
        }
        async {
            let last = self
                .run_unchecked(&self.invocation(&["log", "-1", "--pretty=%B"]))
                .await?;
            // A repository without commits has no log; treat that as "not yet".
            if last.success() && last.stdout.trim() == INITIAL_COMMIT_MESSAGE {
                debug!("HEAD is already the initial commit");
                return self.head_commit().await;
            }

            self.run(&["add", "."]).await?;
            self.run(&["commit", "-m", INITIAL_COMMIT_MESSAGE, "--allow-empty"])
                .await?;
            let commit = self.head_commit().await?;
            info!(commit = %commit, "Created initial commit");
            Ok(commit)
        }
        .instrument(self.span("ensure_initial_commit"))
        .await
    }

    /// Commit modifications to already tracked files.
    pub async fn commit_changes(&self, message: &str) -> VersioningResult<()> {
        if self.disabled("commit_changes") {
            return Ok(());
        }
        async {
            self.run(&["commit", "-a", "-m", message]).await?;
            Ok(())
        }
        .instrument(self.span("commit_changes"))
        .await
    }

    /// Patch text taking `from` to `to`.
    pub async fn diff(&self, from: &str, to: &str) -> VersioningResult<String> {
        if self.disabled("diff") {
            return Ok(DISABLED_SENTINEL.to_string());
        }
        async {
            let output = self.run(&["diff", from, to]).await?;
            Ok(output.stdout)
        }
        .instrument(self.span("diff"))
        .await
    }

    /// Apply patch text to the working tree. The patch is streamed on stdin.
    pub async fn apply_patch(&self, patch: &str) -> VersioningResult<String> {
        if self.disabled("apply_patch") {
            return Ok(DISABLED_SENTINEL.to_string());
        }
        if patch.trim().is_empty() {
            debug!("Empty patch, nothing to apply");
            return Ok(String::new());
        }
        async {
            let invocation = self.invocation(&["apply", "-"]).with_stdin(patch);
            let output = self.run_invocation(invocation).await?;
            Ok(output.diagnostic())
        }
        .instrument(self.span("apply_patch"))
        .await
    }

    /// One line per commit, most recent first.
    pub async fn list_commits(&self) -> VersioningResult<String> {
        if self.disabled("list_commits") {
            return Ok(DISABLED_SENTINEL.to_string());
        }
        async {
            let output = self.run(&["log", "--oneline"]).await?;
            Ok(output.stdout)
        }
        .instrument(self.span("list_commits"))
        .await
    }

    /// Check out `commit` in the working directory, leaving HEAD detached.
    pub async fn revert_to(&self, commit: &str) -> VersioningResult<()> {
        if self.disabled("revert_to") {
            return Ok(());
        }
        async {
            self.run(&["checkout", commit]).await?;
            info!(commit, "Working directory reset to commit");
            Ok(())
        }
        .instrument(self.span("revert_to"))
        .await
    }

    /// Create `name` from HEAD and check it out. Fails if it already exists.
    pub async fn create_branch(&self, name: &str) -> VersioningResult<()> {
        if self.disabled("create_branch") {
            return Ok(());
        }
        async {
            self.run(&["checkout", "-b", name]).await?;
            self.record_switch(name);
            info!(branch = name, "Created branch");
            Ok(())
        }
        .instrument(self.span("create_branch"))
        .await
    }

    pub async fn switch_branch(&self, name: &str) -> VersioningResult<()> {
        if self.disabled("switch_branch") {
            return Ok(());
        }
        async {
            self.run(&["checkout", name]).await?;
            self.record_switch(name);
            debug!(branch = name, "Switched branch");
            Ok(())
        }
        .instrument(self.span("switch_branch"))
        .await
    }

    /// Merge `name` into the current branch.
    pub async fn merge_branch(&self, name: &str) -> VersioningResult<()> {
        if self.disabled("merge_branch") {
            return Ok(());
        }
        async {
            self.run(&["merge", name]).await?;
            Ok(())
        }
        .instrument(self.span("merge_branch"))
        .await
    }

    /// Whether `name` resolves to a revision. Any tool failure reads as `false`.
    pub async fn branch_exists(&self, name: &str) -> bool {
        if self.disabled("branch_exists") {
            return true;
        }
        self.run(&["rev-parse", "--verify", name])
            .instrument(self.span("branch_exists"))
            .await
            .is_ok()
    }

    /// Make `name` the current branch, creating it if needed.
    ///
    /// When the facade is configured to (the default), the branch that was
    /// current beforehand is merged into `name` after the switch.
    pub async fn ensure_branch(&self, name: &str) -> VersioningResult<()> {
        if self.disabled("ensure_branch") {
            return Ok(());
        }
        async {
            let previous = self.current_branch().await?;
            if previous == name {
                debug!(branch = name, "Already on branch");
                return Ok(());
            }

            if !self.branch_exists(name).await {
                self.create_branch(name).await?;
            }
            self.switch_branch(name).await?;

            if self.merge_previous_on_ensure && !previous.is_empty() {
                warn!(
                    from = %previous,
                    into = name,
                    "Merging previously checked out branch into ensured branch"
                );
                self.merge_branch(&previous).await?;
            }
            info!(branch = name, "Checked out branch");
            Ok(())
        }
        .instrument(self.span("ensure_branch"))
        .await
    }

    /// Delete a fully merged branch.
    pub async fn delete_branch(&self, name: &str) -> VersioningResult<()> {
        if self.disabled("delete_branch") {
            return Ok(());
        }
        async {
            self.run(&["branch", "-d", name]).await?;
            info!(branch = name, "Deleted branch");
            Ok(())
        }
        .instrument(self.span("delete_branch"))
        .await
    }

    /// Working branch reserved for this tool.
    pub fn reserved_branch_name(&self) -> &str {
        if self.disabled("reserved_branch_name") {
            return DISABLED_SENTINEL;
        }
        &self.reserved_branch
    }
}
