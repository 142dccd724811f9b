//! Release subcommands.

use super::compile_pattern;
use crate::cli::args::ReleaseCommand;
use crate::cli::{render, OutputManager};
use crate::error::{Error, Result};
use crate::github::models::{EditOverrides, NewRelease};
use crate::github::{
    edit_release, find_release, require_release, retarget, GitHubClient, RandomSuffix,
    RetargetOutcome, RetargetRequest,
};

/// Run one release subcommand against a repository
pub async fn execute(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    command: &ReleaseCommand,
) -> Result<()> {
    match command {
        ReleaseCommand::List => list(client, output, repo).await,
        ReleaseCommand::Info { tag } => {
            let release = require_release(client, repo, tag).await?;
            render::release_info(output, &release, None);
            Ok(())
        }
        ReleaseCommand::Create {
            tag,
            publish,
            prerelease,
            target_commitish,
        } => create(client, output, repo, tag, *publish, *prerelease, target_commitish).await,
        ReleaseCommand::Edit {
            tag,
            tag_name,
            target_commitish,
            name,
            body,
            draft,
            prerelease,
            dry_run,
        } => {
            let overrides = EditOverrides {
                tag_name: tag_name.clone(),
                target_commitish: target_commitish.clone(),
                name: name.clone(),
                body: body.clone(),
                draft: *draft,
                prerelease: *prerelease,
            };
            edit(client, output, repo, tag, &overrides, *dry_run).await
        }
        ReleaseCommand::Retarget {
            tag,
            sha,
            tag_name,
            dry_run,
        } => run_retarget(client, output, repo, tag, sha.as_deref(), tag_name.as_deref(), *dry_run)
            .await,
        ReleaseCommand::Delete {
            pattern,
            keep_pattern,
            dry_run,
        } => delete(client, output, repo, pattern, keep_pattern.as_deref(), *dry_run).await,
        ReleaseCommand::Publish { tag, prerelease } => {
            let overrides = EditOverrides {
                draft: Some(false),
                prerelease: Some(*prerelease),
                ..Default::default()
            };
            client.require_token()?;
            edit_release(client, &RandomSuffix, repo, tag, &overrides, false).await?;
            output.success(&format!("published release '{tag}'"));
            Ok(())
        }
        ReleaseCommand::Unpublish { tag, prerelease } => {
            let overrides = EditOverrides {
                draft: Some(!*prerelease),
                prerelease: Some(*prerelease),
                ..Default::default()
            };
            client.require_token()?;
            edit_release(client, &RandomSuffix, repo, tag, &overrides, false).await?;
            output.success(&format!("unpublished release '{tag}'"));
            Ok(())
        }
        ReleaseCommand::Notes { tag } => notes(client, output, repo, tag).await,
        ReleaseCommand::Debug { tag } => {
            let release = require_release(client, repo, tag).await?;
            output.println(&serde_json::to_string_pretty(&release)?);
            Ok(())
        }
    }
}

async fn list(client: &GitHubClient, output: &OutputManager, repo: &str) -> Result<()> {
    let mut releases = client.releases(repo).await?;
    releases.sort_by(|a, b| a.tag_name.cmp(&b.tag_name));
    for release in &releases {
        render::release_info(output, release, None);
    }
    Ok(())
}

async fn create(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    tag: &str,
    publish: bool,
    prerelease: bool,
    target_commitish: &Option<String>,
) -> Result<()> {
    if find_release(client, repo, tag).await?.is_some() {
        output.println(&format!("release {tag}: already exists"));
        return Ok(());
    }
    client.require_token()?;
    let new = NewRelease {
        tag_name: tag.to_string(),
        draft: !publish && !prerelease,
        prerelease,
        target_commitish: target_commitish.clone(),
    };
    let release = client.create_release(repo, &new).await?;
    render::release_info(output, &release, Some(&format!("created '{tag}' release")));
    Ok(())
}

async fn edit(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    tag: &str,
    overrides: &EditOverrides,
    dry_run: bool,
) -> Result<()> {
    if overrides.is_empty() {
        return Err(Error::InvalidArguments {
            reason: "no field changes requested".to_string(),
        });
    }
    if !dry_run {
        client.require_token()?;
    }
    let updated = edit_release(client, &RandomSuffix, repo, tag, overrides, dry_run).await?;
    if dry_run {
        output.println("dry-run: no changes applied");
    } else {
        render::release_info(output, &updated, Some(&format!("updated '{tag}' release")));
    }
    Ok(())
}

async fn run_retarget(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    tag: &str,
    sha: Option<&str>,
    tag_name: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    if !dry_run {
        client.require_token()?;
    }
    let outcome = retarget(
        client,
        &RandomSuffix,
        RetargetRequest {
            repo,
            current_tag: tag,
            desired_tag: tag_name,
            desired_sha: sha,
            dry_run,
        },
    )
    .await?;
    match outcome {
        RetargetOutcome::Updated(release) => {
            render::release_info(
                output,
                &release,
                Some(&format!("retargeted '{}' release", release.tag_name)),
            );
        }
        RetargetOutcome::Unchanged(_) if dry_run => {
            output.println("dry-run: no changes applied");
        }
        RetargetOutcome::Unchanged(release) => {
            output.println(&format!(
                "release '{}' already in the desired state",
                release.tag_name
            ));
        }
    }
    Ok(())
}

async fn delete(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    pattern: &str,
    keep_pattern: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let pattern = compile_pattern(pattern)?;
    let keep = keep_pattern.map(compile_pattern).transpose()?;
    if !dry_run {
        client.require_token()?;
    }
    for release in client.releases(repo).await? {
        if !pattern.matches(&release.tag_name) {
            log::debug!(
                "skipping release {}: does not match {}",
                release.tag_name,
                pattern
            );
            continue;
        }
        if keep.as_ref().is_some_and(|k| k.matches(&release.tag_name)) {
            continue;
        }
        output.println(&format!("deleting release {}", release.tag_name));
        if dry_run {
            continue;
        }
        client.delete_release(repo, release.id).await?;
    }
    Ok(())
}

async fn notes(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    tag: &str,
) -> Result<()> {
    client.require_token()?;
    let release = require_release(client, repo, tag).await?;
    let editor = std::env::var("EDITOR").map_err(|_| Error::InvalidArguments {
        reason: "EDITOR is not set".to_string(),
    })?;

    let file = tempfile::Builder::new()
        .prefix("ghrel-notes-")
        .suffix(".md")
        .tempfile()?;
    let body = release.body.clone().unwrap_or_default();
    std::fs::write(file.path(), &body)?;

    let status = std::process::Command::new(&editor).arg(file.path()).status()?;
    if !status.success() {
        return Err(Error::Editor {
            editor,
            status: status.code().unwrap_or(-1),
        });
    }

    let edited = std::fs::read_to_string(file.path())?;
    if edited == body {
        output.println("release notes unchanged");
        return Ok(());
    }
    let overrides = EditOverrides {
        body: Some(edited),
        ..Default::default()
    };
    edit_release(client, &RandomSuffix, repo, tag, &overrides, false).await?;
    output.success(&format!("updated release notes for '{tag}'"));
    Ok(())
}
