//! Extra attributes configured by the operator
//!
//! `dcm_extra_tags` lists, one per line, attributes to extract on top of the
//! fixed set. Each line is either a `gggg,eeee` pair or a dictionary keyword.
//! The file is looked up in the working directory first, then beside the
//! executable; when neither exists there are simply no extra attributes.

use crate::config::EXTRA_TAGS_FILE;
use crate::dictionary;
use crate::error::{Result, TagsError};
use crate::key::TagKey;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Candidate locations of the extra tags file, in lookup order.
pub fn candidates() -> Vec<PathBuf> {
    let mut paths = vec![Path::new(".").join(EXTRA_TAGS_FILE)];
    if let Some(dir) = std::env::current_exe().ok().as_deref().and_then(Path::parent) {
        paths.push(dir.join(EXTRA_TAGS_FILE));
    }
    paths
}

/// First candidate that exists.
pub fn locate(candidates: &[PathBuf]) -> Option<&Path> {
    candidates.iter().map(PathBuf::as_path).find(|path| path.exists())
}

/// Resolve every identifier in the file at `path`.
///
/// Blank lines are skipped. An identifier that resolves to nothing is an
/// operator mistake and fails the whole run.
pub fn load_keys(path: &Path) -> Result<Vec<TagKey>> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        error!(path = %path.display(), error = %source, "Unable to read extra_tags file");
        TagsError::ExtraTagsUnreadable { path: path.to_path_buf(), source }
    })?;
    parse_keys(&content)
}

pub fn parse_keys(content: &str) -> Result<Vec<TagKey>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|identifier| {
            let key = dictionary::resolve(identifier);
            if key.is_undefined() {
                error!(identifier, "Unknown tag");
                return Err(TagsError::unknown_tag(identifier));
            }
            Ok(key)
        })
        .collect()
}

/// Keys of the configured extra attributes, empty when no file exists.
pub fn configured_keys() -> Result<Vec<TagKey>> {
    let candidates = candidates();
    match locate(&candidates) {
        Some(path) => {
            let keys = load_keys(path)?;
            debug!(path = %path.display(), count = keys.len(), "Loaded extra tags");
            Ok(keys)
        },
        None => Ok(Vec::new()),
    }
}
