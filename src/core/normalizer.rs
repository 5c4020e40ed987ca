use crate::domain::models::{ExclusionRules, RunStats};
use log::{debug, warn};
use std::path::Path;

/// Drops blank and over-long lines. Returns `None` when the text has more
/// lines than allowed; the file is rejected whole rather than truncated.
///
/// Lines are split on `\n` only, so a `\r` stays at the end of its line.
pub fn normalize_text(text: &str, rules: &ExclusionRules) -> Option<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() > rules.max_file_lines {
        return None;
    }

    let kept: Vec<&str> = lines
        .into_iter()
        .filter(|line| !line.trim().is_empty() && line.chars().count() <= rules.max_line_length)
        .collect();

    Some(kept.join("\n"))
}

/// Reads and normalizes one eligible file. Read failures are booked into
/// `stats.errors` and yield `None`.
pub fn normalize_file<F>(
    path: &Path,
    rules: &ExclusionRules,
    stats: &mut RunStats,
    read: F,
) -> Option<String>
where
    F: Fn(&Path) -> anyhow::Result<String>,
{
    let text = match read(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {}: {:#}", path.display(), e);
            stats.record_error(path.to_path_buf(), format!("{:#}", e));
            return None;
        }
    };

    let normalized = normalize_text(&text, rules);
    if normalized.is_none() {
        debug!(
            "Rejecting {}: more than {} lines",
            path.display(),
            rules.max_file_lines
        );
        stats.rejected_by_normalizer += 1;
    }
    normalized
}
