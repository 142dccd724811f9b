//! Reference subcommands.

use super::compile_pattern;
use crate::cli::args::RefCommand;
use crate::cli::{render, OutputManager};
use crate::error::Result;
use crate::github::models::NewReference;
use crate::github::refs::filter_refs;
use crate::github::GitHubClient;

/// Run one reference subcommand against a repository
pub async fn execute(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    command: &RefCommand,
) -> Result<()> {
    match command {
        RefCommand::List {
            tags,
            pattern,
            verbose,
        } => list(client, output, repo, *tags, pattern.as_deref(), *verbose).await,
        RefCommand::Create { reference, sha } => create(client, output, repo, reference, sha).await,
        RefCommand::Delete {
            pattern,
            keep_pattern,
            tags,
            dry_run,
        } => {
            delete(
                client,
                output,
                repo,
                pattern,
                keep_pattern.as_deref(),
                *tags,
                *dry_run,
            )
            .await
        }
    }
}

async fn list(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    tags: bool,
    pattern: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let refs = client.refs(repo).await?;
    let mut matched = filter_refs(&refs, tags, pattern)?;
    matched.sort_by(|a, b| a.name.cmp(&b.name));
    for reference in matched {
        if verbose {
            render::ref_info(output, reference);
        } else {
            output.println(&reference.name);
        }
    }
    Ok(())
}

async fn create(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    reference: &str,
    sha: &str,
) -> Result<()> {
    client.require_token()?;
    let created = client
        .create_ref(
            repo,
            &NewReference {
                name: format!("refs/{reference}"),
                sha: sha.to_string(),
            },
        )
        .await?;
    render::ref_info(output, &created);
    Ok(())
}

async fn delete(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    pattern: &str,
    keep_pattern: Option<&str>,
    tags: bool,
    dry_run: bool,
) -> Result<()> {
    let keep = keep_pattern.map(compile_pattern).transpose()?;
    if !dry_run {
        client.require_token()?;
    }
    let refs = client.refs(repo).await?;
    for reference in filter_refs(&refs, tags, Some(pattern))? {
        if keep.as_ref().is_some_and(|k| k.matches(&reference.name)) {
            continue;
        }
        output.println(&format!("deleting reference {}", reference.name));
        if dry_run {
            continue;
        }
        client.delete_ref(repo, &reference.name).await?;
    }
    Ok(())
}
