//! GitHub REST integration: typed models, the HTTP client, and the
//! release-tag rewrite protocol built on top of them.

pub mod client;
pub mod models;
pub mod refs;
pub mod retarget;

pub use client::{ClientConfig, GitHubClient, RetryConfig};
pub use models::{
    Account, Asset, EditOverrides, NewRelease, NewReference, Reference, RefObject, Release,
    ReleasePatch,
};
pub use retarget::{
    edit_release, find_release, require_release, retarget, RandomSuffix, RetargetOutcome,
    RetargetRequest, SuffixSource,
};

use crate::error::Result;

/// The primitive remote operations the release-tag rewrite protocol needs.
///
/// [`GitHubClient`] implements this against the real API; tests implement it
/// with an in-memory fake. The protocol only ever goes through this trait,
/// so it never reads ambient configuration.
pub trait ReleaseApi {
    /// List every release of the repository
    fn releases(&self, repo: &str) -> impl Future<Output = Result<Vec<Release>>>;

    /// Replace the mutable fields of a release.
    ///
    /// When `patch.tag_name` differs from the release's current tag, the
    /// remote binds the release to the new name and creates
    /// `refs/tags/<new>` at `patch.target_commitish` if no such reference
    /// exists. The old reference is left behind and must be deleted
    /// explicitly.
    fn patch_release(
        &self,
        repo: &str,
        release_id: u64,
        patch: &ReleasePatch,
    ) -> impl Future<Output = Result<Release>>;

    /// List every git reference of the repository
    fn refs(&self, repo: &str) -> impl Future<Output = Result<Vec<Reference>>>;

    /// Delete a reference by full name, e.g. `refs/tags/1.0.0`
    fn delete_ref(&self, repo: &str, ref_name: &str) -> impl Future<Output = Result<()>>;
}
