// Scripted executor for testing - no processes are spawned

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::command::{CommandError, CommandExecutor, CommandOutput, Invocation};

/// Executor answering from a table of canned responses keyed by argument list.
///
/// Every invocation is recorded, answered or not, so tests can assert on the
/// exact sequence of calls. Unscripted invocations fail with `CommandNotFound`
/// unless a fallback response is configured.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: Mutex<HashMap<String, Vec<Result<CommandOutput, CommandError>>>>,
    fallback: Option<CommandOutput>,
    invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any unscripted invocation with a successful empty output.
    pub fn with_default_success(mut self) -> Self {
        self.fallback = Some(CommandOutput {
            status_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        });
        self
    }

    /// Queue a response for `args`. Responses for the same arguments are
    /// consumed in order; the last one repeats once the queue is drained.
    pub fn respond(self, args: &[&str], response: Result<CommandOutput, CommandError>) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(args.join(" "))
            .or_default()
            .push(response);
        self
    }

    pub fn ok(self, args: &[&str], stdout: &str) -> Self {
        self.respond(
            args,
            Ok(CommandOutput {
                status_code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        )
    }

    pub fn fail(self, args: &[&str], status_code: i32, stderr: &str) -> Self {
        self.respond(
            args,
            Ok(CommandOutput {
                status_code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        )
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Argument lists of every recorded invocation, joined with spaces.
    pub fn executed_args(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(Invocation::display_args)
            .collect()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(invocation.clone());

        let key = invocation.display_args();
        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => match &self.fallback {
                Some(output) => Ok(output.clone()),
                None => Err(CommandError::CommandNotFound {
                    command: format!("{} {}", invocation.program, key),
                }),
            },
        }
    }
}
