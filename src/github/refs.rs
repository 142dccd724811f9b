//! Reference lookup and filtering helpers.
//!
//! Pure functions over a reference snapshot plus the small existence-checked
//! mutations the tag-rewrite sequence relies on.

use crate::error::{Error, Result};
use crate::github::models::Reference;
use crate::github::ReleaseApi;
use glob::Pattern;

/// Filter a reference snapshot.
///
/// With `tags_only`, keep only the `refs/tags/*` namespace. With a
/// `pattern`, keep only references whose full name matches the shell-glob
/// pattern. Pure over the snapshot; no remote calls.
pub fn filter_refs<'a>(
    refs: &'a [Reference],
    tags_only: bool,
    pattern: Option<&str>,
) -> Result<Vec<&'a Reference>> {
    let pattern = pattern
        .map(|p| {
            Pattern::new(p).map_err(|source| Error::Pattern {
                pattern: p.to_string(),
                source,
            })
        })
        .transpose()?;

    Ok(refs
        .iter()
        .filter(|r| !tags_only || r.is_tag())
        .filter(|r| pattern.as_ref().is_none_or(|p| p.matches(&r.name)))
        .collect())
}

/// Full reference name for a tag
pub fn tag_ref_name(tag: &str) -> String {
    format!("refs/tags/{tag}")
}

/// Find the reference for a tag in a snapshot
pub fn find_tag_ref<'a>(refs: &'a [Reference], tag: &str) -> Option<&'a Reference> {
    let name = tag_ref_name(tag);
    refs.iter().find(|r| r.name == name)
}

/// Delete a reference only if it still exists.
///
/// Listing before deleting makes the call idempotent, so a retried or
/// re-invoked rewrite sequence never trips over an already-removed
/// reference. Returns whether a deletion was issued.
pub async fn delete_ref_if_present<A: ReleaseApi>(
    api: &A,
    repo: &str,
    ref_name: &str,
) -> Result<bool> {
    let refs = api.refs(repo).await?;
    if !refs.iter().any(|r| r.name == ref_name) {
        log::debug!("{ref_name} already gone, skipping delete");
        return Ok(false);
    }
    api.delete_ref(repo, ref_name).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::models::RefObject;

    fn snapshot() -> Vec<Reference> {
        [
            ("refs/heads/main", "aaa111"),
            ("refs/tags/1.0.0", "bbb222"),
            ("refs/tags/1.1.0", "ccc333"),
            ("refs/tags/2.0.0-rc.1", "ddd444"),
        ]
        .into_iter()
        .map(|(name, sha)| Reference {
            name: name.to_string(),
            object: RefObject {
                kind: "commit".to_string(),
                sha: sha.to_string(),
            },
        })
        .collect()
    }

    #[test]
    fn no_filters_returns_everything() {
        let refs = snapshot();
        assert_eq!(filter_refs(&refs, false, None).expect("filter").len(), 4);
    }

    #[test]
    fn tags_only_drops_heads() {
        let refs = snapshot();
        let tags = filter_refs(&refs, true, None).expect("filter");
        assert_eq!(tags.len(), 3);
        assert!(tags.iter().all(|r| r.is_tag()));
    }

    #[test]
    fn pattern_selects_matching_names() {
        let refs = snapshot();
        let matched = filter_refs(&refs, false, Some("refs/tags/1.*")).expect("filter");
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].name, "refs/tags/1.0.0");
    }

    #[test]
    fn pattern_and_namespace_compose() {
        let refs = snapshot();
        let matched = filter_refs(&refs, true, Some("*2.0.0*")).expect("filter");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "refs/tags/2.0.0-rc.1");
    }

    #[test]
    fn bad_pattern_is_reported() {
        let refs = snapshot();
        assert!(matches!(
            filter_refs(&refs, false, Some("refs/[")),
            Err(Error::Pattern { .. })
        ));
    }

    #[test]
    fn tag_lookup_uses_exact_name() {
        let refs = snapshot();
        assert_eq!(
            find_tag_ref(&refs, "1.0.0").map(|r| r.object.sha.as_str()),
            Some("bbb222")
        );
        assert!(find_tag_ref(&refs, "1.0").is_none());
    }
}
