use crate::core::eligibility::should_include;
use crate::domain::models::{ExclusionRules, FileCandidate, RunStats, SkipReason};
use anyhow::Context;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{Clear, ClearType},
};
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// Progress indicator for the repository walk
struct ScanProgress {
    start_time: Instant,
    update_interval: Duration,
    last_update: Instant,
    scanned_count: usize,
    eligible_count: usize,
}

impl ScanProgress {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            update_interval: Duration::from_millis(250),
            last_update: Instant::now(),
            scanned_count: 0,
            eligible_count: 0,
        }
    }

    fn update(&mut self, eligible: bool) -> io::Result<()> {
        self.scanned_count += 1;
        if eligible {
            self.eligible_count += 1;
        }

        let now = Instant::now();
        if now.duration_since(self.last_update) >= self.update_interval {
            self.last_update = now;
            let elapsed = now.duration_since(self.start_time).as_secs_f32();
            let files_per_sec = if elapsed > 0.0 {
                self.scanned_count as f32 / elapsed
            } else {
                0.0
            };

            let spinner_chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
            let ticks = self.start_time.elapsed().as_millis() / 100;
            let spinner_idx = (ticks % spinner_chars.len() as u128) as usize;

            let mut stderr = io::stderr();
            stderr.execute(cursor::SavePosition)?;
            stderr.execute(Clear(ClearType::CurrentLine))?;
            write!(
                stderr,
                "{} Scanning repository: {} files scanned, {} eligible ({:.1} files/sec)",
                spinner_chars[spinner_idx], self.scanned_count, self.eligible_count, files_per_sec
            )?;
            stderr.flush()?;
            stderr.execute(cursor::RestorePosition)?;
        }
        Ok(())
    }

    fn finish(&self) -> io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f32();

        let mut stderr = io::stderr();
        stderr.execute(Clear(ClearType::CurrentLine))?;
        writeln!(
            stderr,
            "✓ Scan complete: {} files scanned, {} eligible in {:.1}s",
            self.scanned_count, self.eligible_count, elapsed
        )?;
        Ok(())
    }
}

/// Walks `root` depth-first in file-name order and returns every eligible file.
///
/// Every directory is entered; filtering applies to files only. A directory
/// that cannot be listed or an entry that cannot be stat'ed aborts the walk.
/// `own_output` is the canonical path of a corpus file from an earlier run;
/// it is never a candidate.
pub fn walk_repository(
    root: &Path,
    rules: &ExclusionRules,
    stats: &mut RunStats,
    own_output: Option<&Path>,
) -> anyhow::Result<Vec<PathBuf>> {
    info!("Walking repository: {}", root.display());

    let mut result = Vec::new();
    let mut progress = ScanProgress::new();

    for entry in walkdir::WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;

        if entry.file_type().is_dir() {
            continue;
        }
        if entry.file_type().is_symlink() {
            debug!("Ignoring symlink: {}", entry.path().display());
            continue;
        }

        if own_output.is_some_and(|out| is_same_file(entry.path(), out)) {
            debug!("Skipping {} (output file)", entry.path().display());
            stats.record_skip(SkipReason::OutputFile);
            progress.update(false)?;
            continue;
        }

        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
        let candidate = FileCandidate {
            path: entry.path().to_path_buf(),
            size: metadata.len(),
        };

        let eligible = should_include(&candidate, root, rules, stats);
        progress.update(eligible)?;

        if eligible {
            debug!("Eligible file: {}", candidate.path.display());
            result.push(candidate.path);
        }
    }

    progress.finish()?;
    info!("Found {} eligible files", result.len());
    Ok(result)
}

fn is_same_file(path: &Path, canonical: &Path) -> bool {
    if path.file_name() != canonical.file_name() {
        return false;
    }
    fs::canonicalize(path).is_ok_and(|p| p == canonical)
}

pub fn read_file_text(path: &Path) -> anyhow::Result<String> {
    debug!("Reading file contents: {}", path.display());
    let contents = fs::read_to_string(path)?;
    debug!("Read {} bytes from file", contents.len());
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap().write_all(content).unwrap();
    }

    #[test]
    fn test_read_file_text() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        write(temp_dir.path(), "test.txt", b"Test content\n");

        assert_eq!(read_file_text(&file_path).unwrap(), "Test content\n");
    }

    #[test]
    fn test_read_invalid_utf8_fails() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "latin1.txt", b"caf\xe9\n");

        assert!(read_file_text(&temp_dir.path().join("latin1.txt")).is_err());
    }

    #[test]
    fn test_read_nonexistent_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_file_text(&temp_dir.path().join("nonexistent.txt")).is_err());
    }

    #[test]
    fn test_walk_collects_eligible_files_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "src/b.rs", b"fn b() {}\n");
        write(root, "src/a.rs", b"fn a() {}\n");
        write(root, "README.md", b"# readme\n");
        write(root, "node_modules/pkg/index.js", b"module.exports = 1;\n");
        write(root, "logo.png", b"not really a png\n");

        let mut stats = RunStats::default();
        let files = walk_repository(root, &ExclusionRules::default(), &mut stats, None).unwrap();

        assert_eq!(
            files,
            vec![root.join("README.md"), root.join("src/a.rs"), root.join("src/b.rs")]
        );
        assert_eq!(stats.processed_files, 3);
        assert_eq!(stats.skipped_files, 2);
        assert_eq!(stats.skip_reasons[&SkipReason::ExcludedPath], 1);
        assert_eq!(stats.skip_reasons[&SkipReason::ExcludedExtension], 1);
        assert_eq!(stats.total_size, 10 + 10 + 9);
    }

    #[test]
    fn test_walk_enters_excluded_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "target/debug/a.rs", b"fn a() {}\n");
        write(root, "target/debug/b.rs", b"fn b() {}\n");

        let mut stats = RunStats::default();
        let files = walk_repository(root, &ExclusionRules::default(), &mut stats, None).unwrap();

        assert!(files.is_empty());
        assert_eq!(stats.skipped_files, 2);
    }

    #[test]
    fn test_walk_skips_previous_output_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.rs", b"fn a() {}\n");
        write(root, "output/dataset.jsonl", b"{\"messages\":[]}\n");
        write(root, "other/dataset.jsonl", b"{\"messages\":[]}\n");
        let own = fs::canonicalize(root.join("output/dataset.jsonl")).unwrap();

        let mut stats = RunStats::default();
        let files =
            walk_repository(root, &ExclusionRules::default(), &mut stats, Some(&own)).unwrap();

        assert_eq!(files, vec![root.join("a.rs"), root.join("other/dataset.jsonl")]);
        assert_eq!(stats.skip_reasons[&SkipReason::OutputFile], 1);
        assert_eq!(stats.processed_files, 2);
    }

    #[test]
    fn test_walk_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut stats = RunStats::default();
        let result = walk_repository(
            &temp_dir.path().join("missing"),
            &ExclusionRules::default(),
            &mut stats,
            None,
        );

        assert!(result.is_err());
    }
}
