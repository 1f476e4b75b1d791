use thiserror::Error;

use crate::external::CommandError;

/// Failure of a versioning operation.
///
/// Tool failures are not classified: a merge conflict, a missing branch and an
/// empty commit all surface as [`VersioningError::ToolFailed`] carrying whatever
/// the tool printed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersioningError {
    #[error("{program} is not installed or not on PATH")]
    ToolNotInstalled { program: String },
    #[error("`{command}` exited with status {status_code}: {diagnostic}")]
    ToolFailed {
        command: String,
        status_code: i32,
        diagnostic: String,
    },
    #[error("Command execution error: {0}")]
    Execution(#[from] CommandError),
}

impl VersioningError {
    /// The raw text a caller would show to a user, without any framing.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::ToolFailed { diagnostic, .. } => diagnostic.clone(),
            other => other.to_string(),
        }
    }
}
