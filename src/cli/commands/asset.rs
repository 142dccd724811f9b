//! Asset subcommands.

use super::compile_pattern;
use crate::cli::OutputManager;
use crate::error::{Error, Result};
use crate::github::{require_release, GitHubClient};
use bytes::Bytes;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::cli::args::AssetCommand;

/// Run one asset subcommand against a repository
pub async fn execute(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    command: &AssetCommand,
) -> Result<()> {
    match command {
        AssetCommand::Upload {
            tag,
            patterns,
            dry_run,
        } => upload(client, output, repo, tag, patterns, *dry_run).await,
        AssetCommand::Download { tag, pattern } => {
            download(client, output, repo, tag.as_deref(), pattern.as_deref()).await
        }
        AssetCommand::Erase {
            tag,
            pattern,
            keep_pattern,
            dry_run,
        } => erase(client, output, repo, tag, pattern, keep_pattern.as_deref(), *dry_run).await,
    }
}

/// Expand local file globs, preserving order and dropping duplicates
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let paths = glob::glob(pattern).map_err(|source| Error::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for path in paths {
            let path = path.map_err(|e| Error::Io(e.into_error()))?;
            if path.is_file() && !files.contains(&path) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

async fn upload(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    tag: &str,
    patterns: &[String],
    dry_run: bool,
) -> Result<()> {
    if !dry_run {
        client.require_token()?;
    }
    let release = require_release(client, repo, tag).await?;

    let files = expand_patterns(patterns)?;
    if files.is_empty() {
        output.println(&format!(
            "release {tag}: skipping upload: there are no files matching {}",
            patterns.join(", ")
        ));
        return Ok(());
    }

    // The remote rejects duplicate asset names with a 422; skipping them
    // keeps re-runs of the same upload idempotent.
    let existing: HashSet<&str> = release.assets.iter().map(|a| a.name.as_str()).collect();

    output.println(&format!("uploading '{tag}' release assets:"));
    for path in &files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidArguments {
                reason: format!("invalid asset file name: {}", path.display()),
            })?;
        if existing.contains(name) {
            output.indent(&format!("skipping {name} (already uploaded)"));
            continue;
        }
        output.indent(&format!("uploading {}", path.display()));
        if dry_run {
            continue;
        }
        let content = Bytes::from(std::fs::read(path)?);
        let asset = client.upload_asset(&release, name, content).await?;
        output.indent(&format!("download_url: {}", asset.browser_download_url));
    }
    Ok(())
}

async fn download(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    tag: Option<&str>,
    pattern: Option<&str>,
) -> Result<()> {
    let tag_pattern = tag.map(compile_pattern).transpose()?;
    let name_pattern = pattern.map(compile_pattern).transpose()?;

    for release in client.releases(repo).await? {
        if tag_pattern
            .as_ref()
            .is_some_and(|p| !p.matches(&release.tag_name))
        {
            continue;
        }
        for asset in &release.assets {
            if name_pattern.as_ref().is_some_and(|p| !p.matches(&asset.name)) {
                continue;
            }
            if Path::new(&asset.name).exists() {
                log::debug!("{} already on disk, skipping", asset.name);
                continue;
            }
            output.println(&format!(
                "release {}: downloading {}",
                release.tag_name, asset.name
            ));
            let content = client.download_asset(repo, asset.id).await?;
            std::fs::write(&asset.name, &content)?;
        }
    }
    Ok(())
}

async fn erase(
    client: &GitHubClient,
    output: &OutputManager,
    repo: &str,
    tag: &str,
    pattern: &str,
    keep_pattern: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let pattern = compile_pattern(pattern)?;
    let keep = keep_pattern.map(compile_pattern).transpose()?;
    if !dry_run {
        client.require_token()?;
    }
    let release = require_release(client, repo, tag).await?;

    for asset in &release.assets {
        if !pattern.matches(&asset.name) {
            continue;
        }
        if keep.as_ref().is_some_and(|k| k.matches(&asset.name)) {
            log::debug!("keeping asset {}", asset.name);
            continue;
        }
        output.println(&format!("release {tag}: deleting {}", asset.name));
        if dry_run {
            continue;
        }
        client.delete_asset(repo, asset.id).await?;
    }
    Ok(())
}
