//! Shared names and constants for the versioning facade.

/// Opaque revision handle returned by the external tool. Never parsed.
pub type CommitId = String;

/// Unvalidated branch name, passed through to the external tool as given.
pub type BranchName = String;

/// Payload returned by string-valued operations while versioning is disabled.
pub const DISABLED_SENTINEL: &str = "none";

/// Message marking the commit created by `ensure_initial_commit`.
pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// Working branch used when configuration does not name one.
pub const DEFAULT_RESERVED_BRANCH: &str = "agent-workspace";

/// External executable used when configuration does not name one.
pub const DEFAULT_PROGRAM: &str = "git";
