use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::VersioningMode;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "workspace-vcs")]
#[command(about = "Version an agent workspace through git")]
#[command(long_about = "workspace-vcs commits, branches, diffs and reverts a workspace by delegating \
                       to the git executable. With --mode disabled every command is a no-op that \
                       prints a fixed sentinel.")]
pub struct Cli {
    /// Workspace directory (defaults to the configured working_dir)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
    /// Versioning mode: enabled, git, disabled or none
    #[arg(long, global = true)]
    pub mode: Option<VersioningMode>,
    /// External executable to invoke instead of git
    #[arg(long, global = true)]
    pub program: Option<String>,
    /// Configuration file to load instead of the default lookup
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Print a JSON report instead of the bare payload
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check whether the external tool can be run
    Check,
    /// Create a repository in the workspace unless one exists
    Init,
    /// Print the current branch
    Branch,
    /// Stage everything and commit it, printing the commit id
    CommitAll {
        /// Commit message
        message: String,
    },
    /// Create (or reuse) the initial commit, printing its id
    InitialCommit,
    /// Commit modifications to tracked files
    Commit {
        /// Commit message
        message: String,
    },
    /// Print the patch between two commits
    Diff {
        /// Source commit
        from: String,
        /// Destination commit
        to: String,
    },
    /// Apply a patch file, or `-` to read it from stdin
    Apply {
        /// Patch file path or `-`
        patch: String,
    },
    /// List commits, one per line
    Log,
    /// Reset the working directory to a commit
    Revert {
        /// Commit id
        commit: String,
    },
    /// Create a branch and check it out
    CreateBranch {
        /// Branch name
        name: String,
    },
    /// Check out an existing branch
    Switch {
        /// Branch name
        name: String,
    },
    /// Merge a branch into the current one
    Merge {
        /// Branch name
        name: String,
    },
    /// Print whether a branch exists
    Exists {
        /// Branch name
        name: String,
    },
    /// Make a branch current, creating it if needed (defaults to the reserved branch)
    EnsureBranch {
        /// Branch name
        name: Option<String>,
    },
    /// Delete a fully merged branch
    DeleteBranch {
        /// Branch name
        name: String,
    },
    /// Print the working branch reserved for this tool
    ReservedBranch,
}

impl Commands {
    /// Operation name used in reports and logs
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Check => "ensure_tool_available",
            Self::Init => "initialize",
            Self::Branch => "current_branch",
            Self::CommitAll { .. } => "commit_all",
            Self::InitialCommit => "ensure_initial_commit",
            Self::Commit { .. } => "commit_changes",
            Self::Diff { .. } => "diff",
            Self::Apply { .. } => "apply_patch",
            Self::Log => "list_commits",
            Self::Revert { .. } => "revert_to",
            Self::CreateBranch { .. } => "create_branch",
            Self::Switch { .. } => "switch_branch",
            Self::Merge { .. } => "merge_branch",
            Self::Exists { .. } => "branch_exists",
            Self::EnsureBranch { .. } => "ensure_branch",
            Self::DeleteBranch { .. } => "delete_branch",
            Self::ReservedBranch => "reserved_branch_name",
        }
    }
}
