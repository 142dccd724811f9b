//! # ghrel
//!
//! Manage GitHub releases, release assets and git references from the
//! command line or CI.
//!
//! The interesting part is the release-tag rewrite protocol in
//! [`github::retarget`]: GitHub cannot move the commit behind a release's
//! tag in one call, so the tool simulates an atomic retarget with a
//! checked sequence of primitive calls that preserves the release's
//! identity and stays safe to re-run after a partial failure.
//!
//! ## Usage
//!
//! ```bash
//! ghrel release octocat/hello list
//! ghrel release octocat/hello create 1.0.0 --publish
//! ghrel release octocat/hello retarget 1.0.0 --sha bbb222
//! ghrel asset octocat/hello upload 1.0.0 'dist/*.tar.gz'
//! ghrel ref octocat/hello list --tags
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod github;

pub use error::{Error, HttpFailure, Result, RetargetStep};
pub use github::{
    edit_release, retarget, ClientConfig, EditOverrides, GitHubClient, RandomSuffix, Reference,
    Release, ReleaseApi, RetargetOutcome, RetargetRequest, RetryConfig, SuffixSource,
};
