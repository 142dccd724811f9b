//! Command line argument parsing.
//!
//! The surface mirrors the three command families of the tool: `release`,
//! `asset`, and `ref`, each scoped to a repository given in `owner/name`
//! form. Authentication and host configuration are read here, at the CLI
//! boundary, and threaded into the client explicitly.

use clap::{Parser, Subcommand};
use url::Url;

/// Manage GitHub releases, assets and git references
#[derive(Parser, Debug)]
#[command(
    name = "ghrel",
    version,
    about = "Manage GitHub releases, assets and git references",
    long_about = "Manage GitHub releases, assets and git references from the command line or CI.

Examples:
  ghrel release octocat/hello list
  ghrel release octocat/hello create 1.0.0 --publish
  ghrel release octocat/hello retarget 1.0.0 --sha bbb222
  ghrel asset octocat/hello upload 1.0.0 'dist/*.tar.gz'
  ghrel ref octocat/hello list --tags"
)]
pub struct Args {
    /// GitHub API token; anonymous access works for reading public repos
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// API root, e.g. https://ghe.example.com/api/v3 for Enterprise hosts
    #[arg(
        long,
        global = true,
        env = "GITHUB_API_URL",
        default_value = crate::github::client::DEFAULT_API_ROOT
    )]
    pub api_url: Url,

    /// Command family to run
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Token resolution order: `--github-token` / `GITHUB_TOKEN` (handled
    /// by clap), then `GH_TOKEN`
    pub fn resolve_token(&self) -> Option<String> {
        self.github_token
            .clone()
            .or_else(|| std::env::var("GH_TOKEN").ok())
    }
}

/// Top-level command families
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage releases (list, create, edit, retarget, delete, ...)
    Release {
        /// Repository in owner/name form
        repo: String,
        /// Release operation to run
        #[command(subcommand)]
        command: ReleaseCommand,
    },
    /// Manage release assets (upload, download, erase)
    Asset {
        /// Repository in owner/name form
        repo: String,
        /// Asset operation to run
        #[command(subcommand)]
        command: AssetCommand,
    },
    /// Manage git references (list, create, delete)
    Ref {
        /// Repository in owner/name form
        repo: String,
        /// Reference operation to run
        #[command(subcommand)]
        command: RefCommand,
    },
}

/// Release operations
#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// List releases
    List,
    /// Show one release
    Info {
        /// Tag name of the release
        tag: String,
    },
    /// Create a release
    Create {
        /// Tag to create the release under
        tag: String,
        /// Publish immediately instead of creating a draft
        #[arg(long)]
        publish: bool,
        /// Mark as prerelease
        #[arg(long)]
        prerelease: bool,
        /// Commit SHA or branch to tag (defaults to the default branch)
        #[arg(long)]
        target_commitish: Option<String>,
    },
    /// Edit fields of an existing release
    Edit {
        /// Tag name that currently identifies the release
        tag: String,
        /// Rename the release's tag
        #[arg(long)]
        tag_name: Option<String>,
        /// Move the tag to this commit SHA
        #[arg(long)]
        target_commitish: Option<String>,
        /// Change the display name
        #[arg(long)]
        name: Option<String>,
        /// Change the body text
        #[arg(long)]
        body: Option<String>,
        /// Set the draft flag
        #[arg(long)]
        draft: Option<bool>,
        /// Set the prerelease flag
        #[arg(long)]
        prerelease: Option<bool>,
        /// Decide and log only, do not touch the remote
        #[arg(long)]
        dry_run: bool,
    },
    /// Move the commit and/or rename the tag behind a release
    Retarget {
        /// Tag name that currently identifies the release
        tag: String,
        /// Desired commit SHA
        #[arg(long)]
        sha: Option<String>,
        /// Desired final tag name (defaults to the current one)
        #[arg(long)]
        tag_name: Option<String>,
        /// Decide and log only, do not touch the remote
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete releases whose tag matches a pattern
    Delete {
        /// Shell-glob pattern over tag names
        pattern: String,
        /// Keep releases whose tag matches this pattern
        #[arg(long)]
        keep_pattern: Option<String>,
        /// Print what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
    /// Publish a release (clear the draft flag)
    Publish {
        /// Tag name of the release
        tag: String,
        /// Mark as prerelease while publishing
        #[arg(long)]
        prerelease: bool,
    },
    /// Unpublish a release (set the draft flag)
    Unpublish {
        /// Tag name of the release
        tag: String,
        /// Mark as prerelease instead of draft
        #[arg(long)]
        prerelease: bool,
    },
    /// Edit the release notes in $EDITOR
    Notes {
        /// Tag name of the release
        tag: String,
    },
    /// Dump the raw release record as JSON
    Debug {
        /// Tag name of the release
        tag: String,
    },
}

/// Asset operations
#[derive(Subcommand, Debug)]
pub enum AssetCommand {
    /// Upload local files as release assets
    Upload {
        /// Tag name of the release
        tag: String,
        /// Local file globs to upload
        #[arg(required = true)]
        patterns: Vec<String>,
        /// Print what would be uploaded without uploading
        #[arg(long)]
        dry_run: bool,
    },
    /// Download release assets into the current directory
    Download {
        /// Shell-glob pattern over tag names (all releases when omitted)
        tag: Option<String>,
        /// Shell-glob pattern over asset names (all assets when omitted)
        pattern: Option<String>,
    },
    /// Delete release assets matching a pattern
    Erase {
        /// Tag name of the release
        tag: String,
        /// Shell-glob pattern over asset names
        pattern: String,
        /// Keep assets whose name matches this pattern
        #[arg(long)]
        keep_pattern: Option<String>,
        /// Print what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
}

/// Reference operations
#[derive(Subcommand, Debug)]
pub enum RefCommand {
    /// List references
    List {
        /// Restrict to the refs/tags/ namespace
        #[arg(long)]
        tags: bool,
        /// Shell-glob pattern over full reference names
        #[arg(long)]
        pattern: Option<String>,
        /// Print object details instead of bare names
        #[arg(long)]
        verbose: bool,
    },
    /// Create a reference (e.g. heads/foo, tags/foo)
    Create {
        /// Reference name without the refs/ prefix
        reference: String,
        /// SHA the reference points at
        sha: String,
    },
    /// Delete references matching a pattern
    Delete {
        /// Shell-glob pattern over full reference names
        pattern: String,
        /// Keep references whose name matches this pattern
        #[arg(long)]
        keep_pattern: Option<String>,
        /// Restrict to the refs/tags/ namespace
        #[arg(long)]
        tags: bool,
        /// Print what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
}
