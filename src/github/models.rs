//! Typed models for the GitHub REST payloads ghrel touches.
//!
//! Only the fields the tool reads or round-trips are modeled; unknown fields
//! are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub release.
///
/// `tag_name` is the lookup identity and is mutable; `id` is the durable
/// identity that survives a tag rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Durable release id
    pub id: u64,
    /// Tag the release is bound to
    pub tag_name: String,
    /// Commit SHA or branch name the tag is (or will be) created from
    pub target_commitish: String,
    /// Display name, distinct from the tag
    #[serde(default)]
    pub name: Option<String>,
    /// Release notes body
    #[serde(default)]
    pub body: Option<String>,
    /// Draft releases are invisible to non-collaborators
    pub draft: bool,
    /// Marked as not production ready
    pub prerelease: bool,
    /// Attached binary assets
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Hypermedia template for asset uploads, e.g. `...{?name,label}`
    #[serde(default)]
    pub upload_url: String,
    /// Web page of the release
    #[serde(default)]
    pub html_url: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Account that created the release
    #[serde(default)]
    pub author: Option<Account>,
}

impl Release {
    /// Upload endpoint with the hypermedia suffix stripped
    pub fn upload_endpoint(&self) -> &str {
        match self.upload_url.find('{') {
            Some(idx) => &self.upload_url[..idx],
            None => &self.upload_url,
        }
    }

    /// Find an attached asset by exact file name
    pub fn asset_named(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// A GitHub account, as embedded in releases and assets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Login name
    pub login: String,
}

/// A binary file attached to a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Asset id, used for download and delete endpoints
    pub id: u64,
    /// File name, unique within the release
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Number of downloads so far
    #[serde(default)]
    pub download_count: u64,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: String,
    /// Account that uploaded the asset
    #[serde(default)]
    pub uploader: Option<Account>,
}

/// A git reference: a symbolic name bound to an object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Full reference name, e.g. `refs/tags/1.0.0` or `refs/heads/main`
    #[serde(rename = "ref")]
    pub name: String,
    /// The object the reference points at
    pub object: RefObject,
}

impl Reference {
    /// True for references in the `refs/tags/` namespace
    pub fn is_tag(&self) -> bool {
        self.name.starts_with("refs/tags/")
    }
}

/// Target of a [`Reference`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefObject {
    /// Object type (`commit`, `tag`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Object SHA
    pub sha: String,
}

/// Full-replace payload for `PATCH /repos/{repo}/releases/{id}`.
///
/// The endpoint treats every supplied field as authoritative, so the payload
/// always starts from the current release record and overrides from there.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReleasePatch {
    /// Tag to bind the release to
    pub tag_name: String,
    /// Commit SHA or branch the tag is created from when it does not exist
    pub target_commitish: String,
    /// Display name
    pub name: Option<String>,
    /// Release notes body
    pub body: Option<String>,
    /// Draft flag
    pub draft: bool,
    /// Prerelease flag
    pub prerelease: bool,
}

impl ReleasePatch {
    /// Round-trip the mutable fields of an existing release verbatim
    pub fn from_release(release: &Release) -> Self {
        Self {
            tag_name: release.tag_name.clone(),
            target_commitish: release.target_commitish.clone(),
            name: release.name.clone(),
            body: release.body.clone(),
            draft: release.draft,
            prerelease: release.prerelease,
        }
    }

    /// Apply caller-requested field changes on top of the round-trip base
    pub fn apply(mut self, overrides: &EditOverrides) -> Self {
        if let Some(tag_name) = &overrides.tag_name {
            self.tag_name = tag_name.clone();
        }
        if let Some(target_commitish) = &overrides.target_commitish {
            self.target_commitish = target_commitish.clone();
        }
        if let Some(name) = &overrides.name {
            self.name = Some(name.clone());
        }
        if let Some(body) = &overrides.body {
            self.body = Some(body.clone());
        }
        if let Some(draft) = overrides.draft {
            self.draft = draft;
        }
        if let Some(prerelease) = overrides.prerelease {
            self.prerelease = prerelease;
        }
        self
    }
}

/// Optional field changes for a release edit; `None` leaves the field alone
#[derive(Debug, Clone, Default)]
pub struct EditOverrides {
    /// New tag name
    pub tag_name: Option<String>,
    /// New target commit SHA (triggers the tag-rewrite sequence when the
    /// tag already exists at a different commit)
    pub target_commitish: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New body text
    pub body: Option<String>,
    /// New draft flag
    pub draft: Option<bool>,
    /// New prerelease flag
    pub prerelease: Option<bool>,
}

impl EditOverrides {
    /// True when no field change was requested
    pub fn is_empty(&self) -> bool {
        self.tag_name.is_none()
            && self.target_commitish.is_none()
            && self.name.is_none()
            && self.body.is_none()
            && self.draft.is_none()
            && self.prerelease.is_none()
    }
}

/// Body for `POST /repos/{repo}/releases`
#[derive(Debug, Clone, Serialize)]
pub struct NewRelease {
    /// Tag to create the release under
    pub tag_name: String,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
    /// Commit SHA or branch to tag, defaulting to the repository default
    /// branch when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
}

/// Body for `POST /repos/{repo}/git/refs`
#[derive(Debug, Clone, Serialize)]
pub struct NewReference {
    /// Full reference name, e.g. `refs/tags/1.0.0`
    #[serde(rename = "ref")]
    pub name: String,
    /// SHA the reference points at
    pub sha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release() -> Release {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "tag_name": "1.0.0",
            "target_commitish": "main",
            "name": "First",
            "body": "notes",
            "draft": false,
            "prerelease": true,
            "upload_url": "https://uploads.github.com/repos/o/r/releases/7/assets{?name,label}",
            "assets": [
                {"id": 1, "name": "app.tar.gz", "size": 10}
            ]
        }))
        .expect("release json")
    }

    #[test]
    fn upload_endpoint_strips_hypermedia_suffix() {
        assert_eq!(
            release().upload_endpoint(),
            "https://uploads.github.com/repos/o/r/releases/7/assets"
        );
    }

    #[test]
    fn patch_round_trips_release_fields() {
        let release = release();
        let patch = ReleasePatch::from_release(&release);
        assert_eq!(patch.tag_name, "1.0.0");
        assert_eq!(patch.target_commitish, "main");
        assert_eq!(patch.name.as_deref(), Some("First"));
        assert_eq!(patch.body.as_deref(), Some("notes"));
        assert!(!patch.draft);
        assert!(patch.prerelease);
    }

    #[test]
    fn overrides_only_touch_requested_fields() {
        let patch = ReleasePatch::from_release(&release()).apply(&EditOverrides {
            tag_name: Some("2.0.0".into()),
            draft: Some(true),
            ..Default::default()
        });
        assert_eq!(patch.tag_name, "2.0.0");
        assert!(patch.draft);
        assert_eq!(patch.body.as_deref(), Some("notes"));
        assert!(patch.prerelease);
    }

    #[test]
    fn reference_namespace_check() {
        let tag: Reference = serde_json::from_value(serde_json::json!({
            "ref": "refs/tags/1.0.0",
            "object": {"type": "commit", "sha": "aaa111"}
        }))
        .expect("ref json");
        assert!(tag.is_tag());
        let head: Reference = serde_json::from_value(serde_json::json!({
            "ref": "refs/heads/main",
            "object": {"type": "commit", "sha": "bbb222"}
        }))
        .expect("ref json");
        assert!(!head.is_tag());
    }
}
