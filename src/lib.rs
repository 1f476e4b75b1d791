// Workspace VCS Library - versioning facade for agent workspaces
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod external;
pub mod telemetry;
pub mod versioning;

// Re-export key types for easy access
pub use config::{ObservabilityConfig, VersioningConfig, VersioningMode};
pub use external::{CommandError, CommandExecutor, CommandOutput, Invocation, ProcessCommandExecutor};
pub use telemetry::{create_versioning_span, generate_correlation_id, init_telemetry};
pub use versioning::{
    BranchName, CommitId, VersioningError, VersioningResult, WorkspaceVersioning,
    DISABLED_SENTINEL, INITIAL_COMMIT_MESSAGE,
};
