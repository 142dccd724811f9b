//! The release-tag rewrite protocol.
//!
//! GitHub has no primitive that re-points the commit behind a release's
//! tag. Moving it takes a sequence of non-atomic calls: PATCH the release
//! onto a temporary tag at the new commit (the remote creates the temporary
//! reference as a side effect), delete the orphaned original reference,
//! PATCH the release back onto its final tag, delete the leftover temporary
//! reference. Identity (id, draft, prerelease, name, body, assets) rides
//! through both PATCHes because every payload round-trips the current
//! release record in full.
//!
//! The sequence is not atomic and no rollback is attempted: the first
//! failing call aborts with the step attributed in the error, and recovery
//! is re-invocation — every step is equality- or existence-checked, so a
//! re-run either short-circuits or finishes the job. Concurrent rewrites of
//! the same release from separate processes are the caller's problem; this
//! tool takes no distributed lock.

use crate::error::{Error, Result, RetargetStep};
use crate::github::models::{EditOverrides, Reference, Release, ReleasePatch};
use crate::github::refs::{delete_ref_if_present, find_tag_ref, tag_ref_name};
use crate::github::ReleaseApi;
use uuid::Uuid;

/// Pluggable source of temporary-tag suffixes.
///
/// Implementations must draw from enough entropy that a fresh suffix is
/// overwhelmingly unlikely to collide with any existing reference,
/// including leftovers of previously crashed rewrites.
pub trait SuffixSource {
    /// Produce one suffix of [`SUFFIX_LEN`] lowercase-alphanumeric chars
    fn suffix(&self) -> String;
}

/// Length of generated temporary-tag suffixes
pub const SUFFIX_LEN: usize = 6;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Default [`SuffixSource`] backed by UUIDv4 entropy
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn suffix(&self) -> String {
        Uuid::new_v4()
            .as_bytes()
            .iter()
            .take(SUFFIX_LEN)
            .map(|b| SUFFIX_CHARSET[*b as usize % SUFFIX_CHARSET.len()] as char)
            .collect()
    }
}

/// Arguments of the public [`retarget`] operation
#[derive(Debug, Clone, Copy)]
pub struct RetargetRequest<'a> {
    /// Repository in `owner/name` form
    pub repo: &'a str,
    /// Tag that currently identifies the release
    pub current_tag: &'a str,
    /// Desired final tag name; `None` keeps the current one
    pub desired_tag: Option<&'a str>,
    /// Desired commit SHA; `None` skips the commit dimension entirely
    pub desired_sha: Option<&'a str>,
    /// Decide and log only, issue no mutating call
    pub dry_run: bool,
}

/// Result of a [`retarget`] call
#[derive(Debug, Clone)]
pub enum RetargetOutcome {
    /// Remote state was changed; the contained release is the final state
    Updated(Release),
    /// The desired state already held (or dry-run); zero mutating calls
    Unchanged(Release),
}

impl RetargetOutcome {
    /// The release in its final (or unchanged) state
    pub fn release(&self) -> &Release {
        match self {
            RetargetOutcome::Updated(r) | RetargetOutcome::Unchanged(r) => r,
        }
    }

    /// True when remote state was mutated
    pub fn changed(&self) -> bool {
        matches!(self, RetargetOutcome::Updated(_))
    }
}

/// Find a release by its current tag name
pub async fn find_release<A: ReleaseApi>(
    api: &A,
    repo: &str,
    tag: &str,
) -> Result<Option<Release>> {
    Ok(api
        .releases(repo)
        .await?
        .into_iter()
        .find(|r| r.tag_name == tag))
}

/// Find a release by tag or fail with [`Error::ReleaseNotFound`]
pub async fn require_release<A: ReleaseApi>(api: &A, repo: &str, tag: &str) -> Result<Release> {
    find_release(api, repo, tag)
        .await?
        .ok_or_else(|| Error::ReleaseNotFound {
            repo: repo.to_string(),
            tag: tag.to_string(),
        })
}

/// Change the tag name and/or the commit behind an existing release,
/// presenting the operation as atomic.
///
/// The commit dimension decides against the tag's *reference*, not the
/// release's `target_commitish` field (which is often a branch name):
/// when `refs/tags/<final>` already points at `desired_sha` the dimension
/// is satisfied, and when additionally no rename is requested the call
/// returns [`RetargetOutcome::Unchanged`] without a single mutating
/// request. Repeated invocations with the same desired state are therefore
/// free of side effects.
pub async fn retarget<A: ReleaseApi>(
    api: &A,
    suffixes: &impl SuffixSource,
    request: RetargetRequest<'_>,
) -> Result<RetargetOutcome> {
    let release = require_release(api, request.repo, request.current_tag).await?;
    let final_tag = request.desired_tag.unwrap_or(&release.tag_name).to_string();
    let rename_needed = final_tag != release.tag_name;
    let mut desired_sha = request.desired_sha;

    if let Some(sha) = request.desired_sha {
        let refs = api
            .refs(request.repo)
            .await
            .map_err(|e| step_error(RetargetStep::ResolveRef, e))?;

        match find_tag_ref(&refs, &final_tag) {
            Some(existing) if existing.object.sha == sha => {
                // Tag already at the desired commit; only a rename can
                // remain to be done.
                log::debug!("tag '{final_tag}' already points at {sha}");
                desired_sha = None;
            }
            Some(existing) => {
                if request.dry_run {
                    log::info!(
                        "dry-run: would rewrite tag '{final_tag}' from {} to {sha} via a temporary tag",
                        existing.object.sha
                    );
                    return Ok(RetargetOutcome::Unchanged(release));
                }
                let updated =
                    rewrite_tag_commit(api, suffixes, request.repo, &release, &refs, &final_tag, sha)
                        .await?;
                if rename_needed {
                    // The rewrite bound the final tag; the release's previous
                    // tag reference is still lying around.
                    delete_ref_if_present(api, request.repo, &tag_ref_name(&release.tag_name))
                        .await?;
                }
                return Ok(RetargetOutcome::Updated(updated));
            }
            None => {
                // No reference yet (draft release, or rename onto a fresh
                // name): a single PATCH below creates the tag at the
                // desired commit.
            }
        }
    }

    let sha_patch_needed = desired_sha.is_some_and(|sha| release.target_commitish != sha);
    if !rename_needed && !sha_patch_needed {
        log::info!(
            "release '{}' already in the desired state, nothing to do",
            request.current_tag
        );
        return Ok(RetargetOutcome::Unchanged(release));
    }

    if request.dry_run {
        log::info!(
            "dry-run: would patch release '{}' (tag_name: '{final_tag}', target_commitish: {:?})",
            request.current_tag,
            desired_sha
        );
        return Ok(RetargetOutcome::Unchanged(release));
    }

    let payload = ReleasePatch::from_release(&release).apply(&EditOverrides {
        tag_name: rename_needed.then(|| final_tag.clone()),
        target_commitish: desired_sha.map(str::to_string),
        ..Default::default()
    });
    let updated = api.patch_release(request.repo, release.id, &payload).await?;
    if rename_needed {
        delete_ref_if_present(api, request.repo, &tag_ref_name(&release.tag_name)).await?;
    }
    Ok(RetargetOutcome::Updated(updated))
}

/// Edit a release's fields, running the tag-rewrite sequence first when a
/// commit change is requested against an existing tag.
///
/// Mirrors the PATCH-as-full-replace contract: the payload starts from the
/// current release record and only the requested overrides differ. After a
/// rename, the previous tag reference is deleted.
pub async fn edit_release<A: ReleaseApi>(
    api: &A,
    suffixes: &impl SuffixSource,
    repo: &str,
    current_tag: &str,
    overrides: &EditOverrides,
    dry_run: bool,
) -> Result<Release> {
    let release = require_release(api, repo, current_tag).await?;
    let final_tag = overrides
        .tag_name
        .clone()
        .unwrap_or_else(|| release.tag_name.clone());

    // The commit moves first; the remote cannot re-point an existing tag
    // within the same PATCH that keeps its name.
    let mut base = release;
    if let Some(sha) = &overrides.target_commitish {
        let refs = api
            .refs(repo)
            .await
            .map_err(|e| step_error(RetargetStep::ResolveRef, e))?;
        if let Some(existing) = find_tag_ref(&refs, &final_tag) {
            if existing.object.sha != *sha {
                if dry_run {
                    log::info!(
                        "dry-run: would rewrite tag '{final_tag}' from {} to {sha} via a temporary tag",
                        existing.object.sha
                    );
                } else {
                    base = rewrite_tag_commit(api, suffixes, repo, &base, &refs, &final_tag, sha)
                        .await?;
                }
            }
        }
    }

    let payload = ReleasePatch::from_release(&base).apply(overrides);
    log_field_changes(current_tag, &base, &payload);

    if dry_run {
        return Ok(base);
    }

    let updated = api.patch_release(repo, base.id, &payload).await?;

    if current_tag != payload.tag_name {
        delete_ref_if_present(api, repo, &tag_ref_name(current_tag)).await?;
    }

    Ok(updated)
}

/// The four-step rewrite: temp-tag PATCH, old-ref delete, final-tag PATCH,
/// temp-ref delete. `refs` is the snapshot the temporary name is checked
/// against.
async fn rewrite_tag_commit<A: ReleaseApi>(
    api: &A,
    suffixes: &impl SuffixSource,
    repo: &str,
    release: &Release,
    refs: &[Reference],
    final_tag: &str,
    sha: &str,
) -> Result<Release> {
    let temp_tag = temp_tag_name(refs, suffixes, final_tag);
    log::info!(
        "rewriting tag '{final_tag}' to {sha} via temporary tag '{temp_tag}' (release id {})",
        release.id
    );

    // 1. Move the release onto the temporary tag at the new commit; the
    //    remote creates refs/tags/<temp> as a side effect.
    let mut patch = ReleasePatch::from_release(release);
    patch.tag_name = temp_tag.clone();
    patch.target_commitish = sha.to_string();
    let moved = api
        .patch_release(repo, release.id, &patch)
        .await
        .map_err(|e| step_error(RetargetStep::RenameToTemp, e))?;

    // 2. The original reference is now orphaned; the rename did not remove it.
    delete_ref_if_present(api, repo, &tag_ref_name(final_tag))
        .await
        .map_err(|e| step_error(RetargetStep::DeleteOldRef, e))?;

    // 3. Move the release back onto the final tag, commit kept.
    let mut patch = ReleasePatch::from_release(&moved);
    patch.tag_name = final_tag.to_string();
    patch.target_commitish = sha.to_string();
    let finished = api
        .patch_release(repo, release.id, &patch)
        .await
        .map_err(|e| step_error(RetargetStep::RenameToFinal, e))?;

    // 4. The temporary reference survives the second rename; remove it.
    delete_ref_if_present(api, repo, &tag_ref_name(&temp_tag))
        .await
        .map_err(|e| step_error(RetargetStep::DeleteTempRef, e))?;

    Ok(finished)
}

/// Pick a temporary tag name that collides with nothing in the snapshot.
///
/// A fixed suffix would trip over leftovers of a previously crashed
/// rewrite, so every draw is random and checked against the snapshot.
fn temp_tag_name(refs: &[Reference], suffixes: &impl SuffixSource, final_tag: &str) -> String {
    loop {
        let candidate = format!("{final_tag}-tmp-{}", suffixes.suffix());
        if !refs
            .iter()
            .any(|r| r.name == tag_ref_name(&candidate))
        {
            return candidate;
        }
        log::debug!("temporary tag '{candidate}' already taken, drawing again");
    }
}

fn step_error(step: RetargetStep, source: Error) -> Error {
    Error::Retarget {
        step,
        source: Box::new(source),
    }
}

fn log_field_changes(current_tag: &str, base: &Release, payload: &ReleasePatch) {
    let before = ReleasePatch::from_release(base);
    if before == *payload {
        return;
    }
    let mut changes = Vec::new();
    if before.tag_name != payload.tag_name {
        changes.push(format!(
            "tag_name: '{}' -> '{}'",
            before.tag_name, payload.tag_name
        ));
    }
    if before.target_commitish != payload.target_commitish {
        changes.push(format!(
            "target_commitish: '{}' -> '{}'",
            before.target_commitish, payload.target_commitish
        ));
    }
    if before.name != payload.name {
        changes.push(format!("name: {:?} -> {:?}", before.name, payload.name));
    }
    if before.body != payload.body {
        changes.push(format!(
            "body: {} -> {} bytes",
            before.body.as_deref().map_or(0, str::len),
            payload.body.as_deref().map_or(0, str::len)
        ));
    }
    if before.draft != payload.draft {
        changes.push(format!("draft: {} -> {}", before.draft, payload.draft));
    }
    if before.prerelease != payload.prerelease {
        changes.push(format!(
            "prerelease: {} -> {}",
            before.prerelease, payload.prerelease
        ));
    }
    log::info!("updating '{current_tag}' release: {}", changes.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::models::RefObject;

    #[test]
    fn random_suffix_shape() {
        let source = RandomSuffix;
        for _ in 0..100 {
            let suffix = source.suffix();
            assert_eq!(suffix.len(), SUFFIX_LEN);
            assert!(suffix.bytes().all(|b| SUFFIX_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn random_suffixes_do_not_repeat_in_practice() {
        let source = RandomSuffix;
        let drawn: std::collections::HashSet<String> =
            (0..200).map(|_| source.suffix()).collect();
        // 36^6 names; 200 draws colliding would point at a broken source
        assert_eq!(drawn.len(), 200);
    }

    struct FixedSuffixes {
        queue: std::cell::RefCell<Vec<&'static str>>,
    }

    impl SuffixSource for FixedSuffixes {
        fn suffix(&self) -> String {
            self.queue
                .borrow_mut()
                .pop()
                .expect("ran out of scripted suffixes")
                .to_string()
        }
    }

    fn tag_ref(name: &str) -> Reference {
        Reference {
            name: tag_ref_name(name),
            object: RefObject {
                kind: "commit".to_string(),
                sha: "aaa111".to_string(),
            },
        }
    }

    #[test]
    fn temp_name_avoids_existing_refs() {
        // A leftover of a crashed run occupies the first drawn name
        let refs = vec![tag_ref("1.0.0"), tag_ref("1.0.0-tmp-aaaaaa")];
        let suffixes = FixedSuffixes {
            queue: std::cell::RefCell::new(vec!["bbbbbb", "aaaaaa"]),
        };
        assert_eq!(
            temp_tag_name(&refs, &suffixes, "1.0.0"),
            "1.0.0-tmp-bbbbbb"
        );
    }

    #[test]
    fn temp_names_never_collide_with_seeded_refs() {
        let refs: Vec<Reference> = (0..50)
            .map(|i| tag_ref(&format!("1.0.0-tmp-seed{i:02}")))
            .collect();
        for _ in 0..100 {
            let name = temp_tag_name(&refs, &RandomSuffix, "1.0.0");
            assert!(name.starts_with("1.0.0-tmp-"));
            assert!(!refs.iter().any(|r| r.name == tag_ref_name(&name)));
        }
    }

    #[test]
    fn temp_name_takes_first_free_draw() {
        let refs = vec![tag_ref("1.0.0")];
        let suffixes = FixedSuffixes {
            queue: std::cell::RefCell::new(vec!["cccccc"]),
        };
        assert_eq!(
            temp_tag_name(&refs, &suffixes, "1.0.0"),
            "1.0.0-tmp-cccccc"
        );
    }
}
