//! Command executors gluing the CLI surface to the github module.

mod asset;
mod reference;
mod release;

use crate::cli::{Args, Command, OutputManager};
use crate::error::{Error, Result};
use crate::github::{ClientConfig, GitHubClient, RetryConfig};
use glob::Pattern;

/// Execute the parsed command line
pub async fn execute_command(args: Args) -> Result<()> {
    let output = OutputManager::new();
    let config = ClientConfig::new(args.resolve_token())
        .with_api_root(args.api_url.clone())
        .with_retry(RetryConfig::from_env());
    let client = GitHubClient::new(config)?;

    match &args.command {
        Command::Release { repo, command } => {
            release::execute(&client, &output, repo, command).await
        }
        Command::Asset { repo, command } => asset::execute(&client, &output, repo, command).await,
        Command::Ref { repo, command } => {
            reference::execute(&client, &output, repo, command).await
        }
    }
}

/// Compile a shell-glob pattern with error context
fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
