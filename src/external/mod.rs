//! External tool abstractions
//!
//! This module provides the trait-based process-execution interface the
//! versioning facade delegates to, enabling testable code through dependency
//! injection and fake implementations.

pub mod command;
#[cfg(any(test, feature = "testing"))]
pub mod mocks;

pub use command::{CommandError, CommandExecutor, CommandOutput, Invocation, ProcessCommandExecutor};
#[cfg(any(test, feature = "testing"))]
pub use command::MockCommandExecutor;
#[cfg(any(test, feature = "testing"))]
pub use mocks::ScriptedExecutor;
