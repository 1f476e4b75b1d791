use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use workspace_vcs::cli::{commands, Cli};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    tokio::runtime::Runtime::new()?.block_on(commands::run(cli))
}
