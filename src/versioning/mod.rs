//! Workspace versioning facade
//!
//! Translates high level intents (initialize, commit, branch, diff, revert) into
//! external tool invocations and normalizes the outcome into a single result type.

pub mod error;
pub mod facade;
pub mod types;

pub use error::VersioningError;
pub use facade::{VersioningResult, WorkspaceVersioning};
pub use types::{
    BranchName, CommitId, DEFAULT_PROGRAM, DEFAULT_RESERVED_BRANCH, DISABLED_SENTINEL,
    INITIAL_COMMIT_MESSAGE,
};
