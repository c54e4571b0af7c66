//! Workspace member discovery.
//!
//! Member patterns from the root manifest's `workspaces` field are expanded
//! relative to the root directory. Patterns starting with `!` exclude
//! matches. Only directories that contain a `package.json` are members.

use crate::error::{Error, Result};
use crate::manifest::MANIFEST_FILE;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories that are never searched for members.
const PRUNED_DIRS: [&str; 4] = ["node_modules", ".git", "target", "dist"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Resolves glob patterns to find directories, handling exclusions.
///
/// # Arguments
///
/// * `root` - The root directory to resolve patterns from.
/// * `patterns` - List of glob patterns to match (e.g., "packages/*").
///   Patterns starting with "!" are treated as exclusions.
///
/// # Returns
///
/// A sorted list of unique paths (rooted under `root`) that match the
/// patterns and are not excluded.
///
/// # Errors
///
/// Returns an error if any glob pattern is invalid or if the filesystem
/// cannot be read while walking `root`.
pub fn resolve_glob_patterns(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut inclusion_patterns = Vec::new();
    let mut exclusion_patterns = Vec::new();

    for raw in patterns {
        let (target, body) = match raw.trim().strip_prefix('!') {
            Some(stripped) => (&mut exclusion_patterns, stripped),
            None => (&mut inclusion_patterns, raw.trim()),
        };
        let normalized = body.trim_start_matches("./").trim_end_matches('/');
        if normalized.is_empty() {
            continue;
        }
        let pattern = Pattern::new(normalized).map_err(|source| Error::InvalidGlob {
            pattern: raw.clone(),
            source,
        })?;
        target.push(pattern);
    }

    if inclusion_patterns.is_empty() {
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    let mut matched = BTreeSet::new();

    for entry in walker.filter_entry(|e| {
        e.depth() == 0
            || e
                .file_name()
                .to_str()
                .is_none_or(|name| !PRUNED_DIRS.contains(&name))
    }) {
        let entry = entry
            .map_err(|e| Error::io(e.into(), root, "walking workspace directories"))?;
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }

        let Ok(rel_path) = entry.path().strip_prefix(root) else {
            continue;
        };

        let matches = |p: &Pattern| p.matches_path_with(rel_path, MATCH_OPTIONS);
        if exclusion_patterns.iter().any(matches) {
            continue;
        }
        if inclusion_patterns.iter().any(matches) {
            matched.insert(entry.path().to_path_buf());
        }
    }

    Ok(matched.into_iter().collect())
}

/// Directories under `root` that match `patterns` and contain a manifest.
///
/// # Errors
///
/// Returns an error if a pattern is invalid or the tree cannot be walked.
pub fn discover_member_dirs(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let dirs = resolve_glob_patterns(root, patterns)?
        .into_iter()
        .filter(|dir| dir.join(MANIFEST_FILE).is_file())
        .collect::<Vec<_>>();
    tracing::debug!(
        root = %root.display(),
        count = dirs.len(),
        "Discovered workspace member directories"
    );
    Ok(dirs)
}
