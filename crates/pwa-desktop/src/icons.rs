//! Icon selection over manifest icon declarations
//!
//! A platform asks for square icons by dimension (`"512"`) and the selector
//! answers with the first declared icon that:
//! - has the platform's file extension **or** its MIME type, and
//! - lists a `WxH` token with both sides equal to the requested size.
//!
//! Sizes are compared as strings, so `"0512x0512"` does not match `"512"`.

use std::path::Path;
use tracing::debug;
use url::Url;

use crate::manifest::{IconDescriptor, Manifest};

/// Extension and MIME type a platform can consume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRules {
    extension: String,
    mime_type: String,
}

impl IconRules {
    /// `extension` may be given with or without its leading dot
    pub fn new(extension: &str, mime_type: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_lowercase(),
            mime_type: mime_type.to_lowercase(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn accepts(&self, icon: &IconDescriptor) -> bool {
        let by_extension = src_extension(&icon.src)
            .map(|ext| ext.to_lowercase() == self.extension)
            .unwrap_or(false);
        let by_type = icon
            .mime_type
            .as_deref()
            .map(|t| t.to_lowercase() == self.mime_type)
            .unwrap_or(false);
        by_extension || by_type
    }
}

/// An icon chosen for one required size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSelection {
    /// Name the platform expects in the images directory, e.g. `512.png`
    pub file_name: String,
    /// `src` of the matched descriptor, possibly relative
    pub url: String,
}

/// Extension of the path component of `src`, without the dot
fn src_extension(src: &str) -> Option<String> {
    let path = match Url::parse(src) {
        Ok(url) => url.path().to_string(),
        Err(_) => src
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    Path::new(&path)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
}

fn has_square_size(sizes: &str, size: &str) -> bool {
    sizes.split_whitespace().any(|token| {
        let token = token.to_lowercase();
        let dimensions: Vec<&str> = token.split('x').collect();
        dimensions.len() == 2 && dimensions[0] == size && dimensions[1] == size
    })
}

/// Find the first icon usable by `rules` that declares a `size`x`size` variant
pub fn select_icon<'m>(
    manifest: &'m Manifest,
    size: &str,
    rules: &IconRules,
) -> Option<&'m IconDescriptor> {
    let size = size.trim().to_lowercase();
    let found = manifest.icons().iter().find(|icon| {
        rules.accepts(icon)
            && icon
                .sizes
                .as_deref()
                .map(|sizes| has_square_size(sizes, &size))
                .unwrap_or(false)
    });
    debug!(size = %size, found = found.is_some(), "icons.select");
    found
}

/// Resolve every required size, skipping the ones the manifest cannot satisfy
pub fn collect_icons_for_sizes<S: AsRef<str>>(
    manifest: &Manifest,
    sizes: &[S],
    rules: &IconRules,
) -> Vec<IconSelection> {
    sizes
        .iter()
        .filter_map(|size| {
            let size = size.as_ref();
            select_icon(manifest, size, rules).map(|icon| IconSelection {
                file_name: format!("{}.{}", size, rules.extension()),
                url: icon.src.clone(),
            })
        })
        .collect()
}

/// Append an icon declaration; repeated calls add repeated entries
pub fn register_icon(manifest: &mut Manifest, file_name: &str, size: &str) {
    manifest
        .icons
        .get_or_insert(None)
        .get_or_insert_with(Vec::new)
        .push(IconDescriptor::new(file_name, size.to_lowercase().trim()));
}
