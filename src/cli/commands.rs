use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::warn;

use super::{Cli, Commands};
use crate::config::VersioningConfig;
use crate::external::{CommandExecutor, ProcessCommandExecutor};
use crate::telemetry::init_telemetry;
use crate::versioning::{VersioningError, WorkspaceVersioning};

/// Outcome of one CLI invocation, printed with `--json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReport {
    pub operation: &'static str,
    pub ok: bool,
    pub payload: Value,
}

/// Resolve configuration: file or default lookup, then command-line overrides.
///
/// Call [`load_env_file`] first when the default lookup should see `.env`.
pub fn resolve_config(cli: &Cli) -> Result<VersioningConfig> {
    let mut config = match &cli.config {
        Some(path) => VersioningConfig::load_from(path)?,
        None => VersioningConfig::load()?,
    };

    if let Some(dir) = &cli.dir {
        config.working_dir = dir.clone();
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(program) = &cli.program {
        config.program = program.clone();
    }
    Ok(config)
}

async fn read_patch(source: &str) -> Result<String> {
    if source == "-" {
        let mut patch = String::new();
        tokio::io::stdin()
            .read_to_string(&mut patch)
            .await
            .context("Failed to read patch from stdin")?;
        return Ok(patch);
    }
    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read patch file {source}"))
}

/// Run one subcommand against the facade and produce its report.
pub async fn dispatch(vcs: &WorkspaceVersioning, command: &Commands) -> Result<CommandReport> {
    let outcome: Result<Value, VersioningError> = match command {
        Commands::Check => Ok(Value::Bool(vcs.ensure_tool_available().await)),
        Commands::Init => vcs.initialize().await.map(|()| Value::Null),
        Commands::Branch => vcs.current_branch().await.map(Value::String),
        Commands::CommitAll { message } => vcs.commit_all(message).await.map(Value::String),
        Commands::InitialCommit => vcs.ensure_initial_commit().await.map(Value::String),
        Commands::Commit { message } => vcs.commit_changes(message).await.map(|()| Value::Null),
        Commands::Diff { from, to } => vcs.diff(from, to).await.map(Value::String),
        Commands::Apply { patch } => {
            let patch = read_patch(patch).await?;
            vcs.apply_patch(&patch).await.map(Value::String)
        }
        Commands::Log => vcs.list_commits().await.map(Value::String),
        Commands::Revert { commit } => vcs.revert_to(commit).await.map(|()| Value::Null),
        Commands::CreateBranch { name } => vcs.create_branch(name).await.map(|()| Value::Null),
        Commands::Switch { name } => vcs.switch_branch(name).await.map(|()| Value::Null),
        Commands::Merge { name } => vcs.merge_branch(name).await.map(|()| Value::Null),
        Commands::Exists { name } => Ok(Value::Bool(vcs.branch_exists(name).await)),
        Commands::EnsureBranch { name } => {
            let name = name
                .clone()
                .unwrap_or_else(|| vcs.reserved_branch_name().to_string());
            vcs.ensure_branch(&name).await.map(|()| Value::Null)
        }
        Commands::DeleteBranch { name } => vcs.delete_branch(name).await.map(|()| Value::Null),
        Commands::ReservedBranch => Ok(Value::String(vcs.reserved_branch_name().to_string())),
    };

    let operation = command.operation();
    Ok(match outcome {
        Ok(payload) => CommandReport {
            operation,
            ok: true,
            payload,
        },
        Err(e) => {
            tracing::error!(operation, error = %e, "Versioning operation failed");
            CommandReport {
                operation,
                ok: false,
                payload: Value::String(e.diagnostic()),
            }
        }
    })
}

fn render(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    let text = match &report.payload {
        Value::Null => return Ok(()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if report.ok {
        let text = text.trim_end();
        if !text.is_empty() {
            println!("{text}");
        }
    } else {
        eprintln!("{}", text.trim_end());
    }
    Ok(())
}

/// Load `.env` for the default configuration lookup.
///
/// A malformed file is not fatal; the error is handed back so it can be logged
/// once telemetry is up.
pub fn load_env_file(cli: &Cli) -> Option<anyhow::Error> {
    if cli.config.is_some() {
        return None;
    }
    VersioningConfig::load_env_file().err()
}

/// Entry point shared by the binary: configure, run, report.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let env_error = load_env_file(&cli);
    let config = resolve_config(&cli)?;
    // A subscriber may already be installed when embedded; that is not fatal.
    let _ = init_telemetry(&config.observability);
    if let Some(e) = env_error {
        warn!(error = %e, "Ignoring malformed .env file");
    }

    let executor: Arc<dyn CommandExecutor> = Arc::new(ProcessCommandExecutor);
    let vcs = WorkspaceVersioning::from_config(&config, executor);

    let report = dispatch(&vcs, &cli.command).await?;
    render(&report, cli.json)?;

    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
