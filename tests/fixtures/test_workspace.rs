use anyhow::Result;
/// Test workspace for running the versioning facade against a real git binary
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use workspace_vcs::{ProcessCommandExecutor, VersioningMode, WorkspaceVersioning};

/// A temporary directory paired with a facade bound to it.
pub struct TestWorkspace {
    temp_dir: TempDir,
    pub vcs: WorkspaceVersioning,
}

impl TestWorkspace {
    /// Create an empty, unversioned workspace
    pub fn new() -> Result<Self> {
        Self::with_mode(VersioningMode::Enabled)
    }

    pub fn with_mode(mode: VersioningMode) -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let vcs = WorkspaceVersioning::new(
            temp_dir.path(),
            mode,
            Arc::new(ProcessCommandExecutor),
        );
        Ok(Self { temp_dir, vcs })
    }

    /// Create a workspace with an initialized repository and a committer identity
    pub async fn initialized() -> Result<Self> {
        let workspace = Self::new()?;
        workspace.vcs.initialize().await?;
        workspace.configure_identity()?;
        Ok(workspace)
    }

    /// Set a repository-local identity so commits work on machines without one
    pub fn configure_identity(&self) -> Result<()> {
        let repo = self.repo()?;
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;
        config.set_bool("commit.gpgsign", false)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn repo(&self) -> Result<git2::Repository> {
        Ok(git2::Repository::open(self.path())?)
    }

    /// Commit id HEAD points at, read through libgit2
    pub fn head_id(&self) -> Result<String> {
        let repo = self.repo()?;
        let head = repo.head()?;
        let id = head.peel_to_commit()?.id().to_string();
        Ok(id)
    }

    pub fn write_file(&self, relative_path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.path().join(relative_path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }

    pub fn read_file(&self, relative_path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.path().join(relative_path))?)
    }

    pub fn file_exists(&self, relative_path: &str) -> bool {
        self.path().join(relative_path).exists()
    }
}

pub fn is_full_commit_id(id: &str) -> bool {
    id.len() == 40 && id.chars().all(|c| c.is_ascii_hexdigit())
}
