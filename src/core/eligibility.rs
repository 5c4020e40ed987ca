use crate::core::classifier::is_binary_file;
use crate::core::record_builder::relative_path;
use crate::domain::models::{ExclusionRules, FileCandidate, PathMatch, RunStats, SkipReason};
use log::debug;
use std::path::Path;

/// Runs the ordered checks and returns the first reason to skip, if any.
pub fn evaluate(
    candidate: &FileCandidate,
    root: &Path,
    rules: &ExclusionRules,
) -> Option<SkipReason> {
    let path = candidate.path.as_path();
    let rel = relative_path(path, root);

    if is_excluded_path(&rel, rules) {
        return Some(SkipReason::ExcludedPath);
    }
    if rules.apply_hidden_rule && is_hidden(&rel, &rules.hidden_prefix) {
        return Some(SkipReason::Hidden);
    }
    if is_binary_file(path) {
        return Some(SkipReason::Binary);
    }

    let ext = path.extension().and_then(|e| e.to_str());
    if ext.is_some_and(|e| rules.excluded_extensions.iter().any(|x| x == e)) {
        return Some(SkipReason::ExcludedExtension);
    }

    let name = path.file_name().and_then(|n| n.to_str());
    if name.is_some_and(|n| rules.excluded_files.iter().any(|x| x == n)) {
        return Some(SkipReason::ExcludedFileName);
    }

    if candidate.size > rules.max_file_size_bytes {
        return Some(SkipReason::TooLarge);
    }

    None
}

/// Applies [`evaluate`] and books the outcome into `stats`.
pub fn should_include(
    candidate: &FileCandidate,
    root: &Path,
    rules: &ExclusionRules,
    stats: &mut RunStats,
) -> bool {
    match evaluate(candidate, root, rules) {
        Some(reason) => {
            debug!("Skipping {} ({})", candidate.path.display(), reason);
            stats.record_skip(reason);
            false
        }
        None => {
            stats.record_accept(candidate.size);
            true
        }
    }
}

fn is_excluded_path(rel: &str, rules: &ExclusionRules) -> bool {
    match rules.path_match {
        PathMatch::Substring => rules.excluded_dirs.iter().any(|frag| rel.contains(frag.as_str())),
        PathMatch::Component => rel
            .split('/')
            .any(|segment| rules.excluded_dirs.iter().any(|frag| frag == segment)),
    }
}

fn is_hidden(rel: &str, prefix: &str) -> bool {
    !prefix.is_empty() && rel.split('/').any(|segment| segment.starts_with(prefix))
}
