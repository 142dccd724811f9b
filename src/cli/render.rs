//! Field-table rendering of releases, assets and references.

use crate::cli::OutputManager;
use crate::github::models::{Asset, Reference, Release};

/// Print the field table of a release, followed by its assets
pub fn release_info(output: &OutputManager, release: &Release, title: Option<&str>) {
    match title {
        Some(title) => output.println(title),
        None => output.println(&format!("release '{}' info", release.tag_name)),
    }
    output.indent(&format!("Tag name      : {}", release.tag_name));
    if let Some(name) = &release.name {
        output.indent(&format!("Name          : {name}"));
    }
    output.indent(&format!("ID            : {}", release.id));
    if let Some(created_at) = &release.created_at {
        output.indent(&format!("Created       : {created_at}"));
    }
    if !release.html_url.is_empty() {
        output.indent(&format!("URL           : {}", release.html_url));
    }
    if let Some(author) = &release.author {
        output.indent(&format!("Author        : {}", author.login));
    }
    output.indent(&format!("Is published  : {}", !release.draft));
    output.indent(&format!("Is prerelease : {}", release.prerelease));
    if let Some(body) = &release.body {
        if !body.is_empty() {
            output.indent("Release notes :");
            output.indent(body);
        }
    }
    output.println("");
    for (i, asset) in release.assets.iter().enumerate() {
        asset_info(output, i, asset);
    }
}

/// Print the field table of one asset
pub fn asset_info(output: &OutputManager, index: usize, asset: &Asset) {
    output.indent(&format!("Asset #{index}"));
    output.indent(&format!("  name      : {}", asset.name));
    output.indent(&format!("  size      : {}", asset.size));
    if let Some(uploader) = &asset.uploader {
        output.indent(&format!("  uploader  : {}", uploader.login));
    }
    output.indent(&format!("  URL       : {}", asset.browser_download_url));
    output.indent(&format!("  Downloads : {}", asset.download_count));
    output.println("");
}

/// Print the field table of one reference
pub fn ref_info(output: &OutputManager, reference: &Reference) {
    output.println(&format!("Reference '{}'", reference.name));
    output.indent("Object");
    output.indent(&format!("  type : {}", reference.object.kind));
    output.indent(&format!("  sha  : {}", reference.object.sha));
    output.println("");
}
