use crate::domain::models::{ConversationRecord, RunStats};
use anyhow::Context;
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub trait RecordWriter {
    fn write_record(&mut self, record: &ConversationRecord) -> anyhow::Result<()>;
}

/// Appends one JSON document per line. The file is truncated when the writer
/// is created and each record goes out in a single write followed by a flush.
pub struct JsonlWriter {
    path: PathBuf,
    file: File,
}

impl JsonlWriter {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        debug!("Opened output file: {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordWriter for JsonlWriter {
    fn write_record(&mut self, record: &ConversationRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        Ok(())
    }
}

pub fn create_writer(output_format: &str, path: &Path) -> anyhow::Result<Box<dyn RecordWriter>> {
    if output_format != "jsonl" {
        warn!(
            "Output format '{}' is only used as the file extension; writing JSON Lines",
            output_format
        );
    }
    let writer = JsonlWriter::create(path)?;
    info!("Writing corpus to {}", writer.path().display());
    Ok(Box::new(writer))
}

pub fn print_summary(stats: &RunStats, output_path: &Path) -> io::Result<()> {
    let mut stdout = io::stdout();

    stdout.execute(SetForegroundColor(Color::Green))?;
    writeln!(stdout, "\n✓ Corpus written to {}", output_path.display())?;
    stdout.execute(ResetColor)?;

    writeln!(stdout, "  Processed files: {}", stats.processed_files)?;
    writeln!(stdout, "  Skipped files:   {}", stats.skipped_files)?;
    for (reason, count) in &stats.skip_reasons {
        writeln!(stdout, "    {:<14} {}", format!("{}:", reason), count)?;
    }
    writeln!(stdout, "  Records written: {}", stats.records_written)?;
    if stats.rejected_by_normalizer > 0 {
        writeln!(
            stdout,
            "  Rejected (too many lines): {}",
            stats.rejected_by_normalizer
        )?;
    }
    writeln!(stdout, "  Total size:      {} bytes", stats.total_size)?;

    if !stats.errors.is_empty() {
        stdout.execute(SetForegroundColor(Color::Yellow))?;
        writeln!(stdout, "\n{} files could not be read:", stats.errors.len())?;
        stdout.execute(ResetColor)?;
        for error in &stats.errors {
            writeln!(stdout, "  {}: {}", error.path.display(), error.message)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Message, Role};
    use tempfile::TempDir;

    fn record(content: &str) -> ConversationRecord {
        ConversationRecord {
            messages: vec![Message {
                role: Role::Assistant,
                content: content.to_string(),
            }],
        }
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out/nested/data.jsonl");

        let mut writer = JsonlWriter::create(&path).unwrap();
        writer.write_record(&record("a")).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_each_record_is_one_terminated_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.jsonl");

        let mut writer = JsonlWriter::create(&path).unwrap();
        writer.write_record(&record("line one\nline two")).unwrap();
        writer.write_record(&record("")).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with('\n'));
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ConversationRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.messages[0].content, "line one\nline two");
    }

    #[test]
    fn test_existing_file_is_truncated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.jsonl");
        fs::write(&path, "stale\nstale\nstale\n").unwrap();

        let mut writer = JsonlWriter::create(&path).unwrap();
        writer.write_record(&record("fresh")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_create_writer_accepts_other_format_tags() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");

        let mut writer = create_writer("json", &path).unwrap();
        writer.write_record(&record("x")).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<ConversationRecord>(written.trim_end()).is_ok());
    }

    #[test]
    fn test_unwritable_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        assert!(JsonlWriter::create(&blocker.join("data.jsonl")).is_err());
    }
}
