use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert software engineer. You write clean, correct and idiomatic code.";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub repo_path: PathBuf,
    pub output_dir: PathBuf,
    pub file_name: String,
    pub output_format: String,
    pub system_prompt: String,
}

impl RunConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.file_name, self.output_format))
    }
}

/// How excluded directory fragments are matched against a relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// Fragment may appear anywhere in the relative path string.
    Substring,
    /// Fragment must equal a whole path segment.
    Component,
}

#[derive(Debug, Clone)]
pub struct ExclusionRules {
    pub excluded_dirs: Vec<String>,
    /// Compared against `Path::extension`, without the leading dot.
    pub excluded_extensions: Vec<String>,
    pub excluded_files: Vec<String>,
    pub hidden_prefix: String,
    pub apply_hidden_rule: bool,
    pub path_match: PathMatch,
    pub max_file_size_bytes: u64,
    /// Counted in `char`s, not UTF-16 code units, so astral characters such as
    /// emoji count once each.
    pub max_line_length: usize,
    pub max_file_lines: usize,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            excluded_dirs: owned(&[
                "node_modules",
                ".git",
                "dist",
                "build",
                "target",
                "coverage",
                "__pycache__",
                ".next",
                ".idea",
                ".vscode",
                "vendor",
                "venv",
                ".venv",
            ]),
            excluded_extensions: owned(&[
                "png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "webp", "tiff", "psd", "pdf",
                "zip", "tar", "gz", "tgz", "bz2", "xz", "rar", "7z", "jar", "war", "exe", "dll",
                "so", "dylib", "o", "a", "class", "pyc", "wasm", "bin", "dat", "db", "sqlite",
                "woff", "woff2", "ttf", "otf", "eot", "mp3", "mp4", "wav", "ogg", "avi", "mov",
                "webm", "lock", "log", "map",
            ]),
            excluded_files: owned(&[
                "package-lock.json",
                "yarn.lock",
                "pnpm-lock.yaml",
                "Cargo.lock",
                "poetry.lock",
                "composer.lock",
                "Gemfile.lock",
                ".DS_Store",
                "Thumbs.db",
            ]),
            hidden_prefix: ".".to_string(),
            apply_hidden_rule: false,
            path_match: PathMatch::Substring,
            max_file_size_bytes: 1_000_000,
            max_line_length: 500,
            max_file_lines: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkipReason {
    ExcludedPath,
    Hidden,
    Binary,
    ExcludedExtension,
    ExcludedFileName,
    TooLarge,
    OutputFile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::ExcludedPath => "excluded path",
            SkipReason::Hidden => "hidden",
            SkipReason::Binary => "binary",
            SkipReason::ExcludedExtension => "extension",
            SkipReason::ExcludedFileName => "file name",
            SkipReason::TooLarge => "size limit",
            SkipReason::OutputFile => "output file",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// Counters for a single run.
///
/// `processed_files` counts files accepted by the eligibility filter, which can be
/// higher than `records_written` when the normalizer later rejects a file.
#[derive(Debug, Default)]
pub struct RunStats {
    pub processed_files: usize,
    pub skipped_files: usize,
    pub total_size: u64,
    pub records_written: usize,
    pub rejected_by_normalizer: usize,
    pub skip_reasons: BTreeMap<SkipReason, usize>,
    pub errors: Vec<FileError>,
}

impl RunStats {
    pub fn record_skip(&mut self, reason: SkipReason) {
        self.skipped_files += 1;
        *self.skip_reasons.entry(reason).or_insert(0) += 1;
    }

    pub fn record_accept(&mut self, size: u64) {
        self.processed_files += 1;
        self.total_size += size;
    }

    pub fn record_error(&mut self, path: PathBuf, message: impl Into<String>) {
        self.errors.push(FileError {
            path,
            message: message.into(),
        });
    }
}
