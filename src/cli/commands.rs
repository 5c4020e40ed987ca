use crate::core::normalizer::normalize_file;
use crate::core::record_builder::build_record;
use crate::domain::models::{DEFAULT_SYSTEM_PROMPT, ExclusionRules, PathMatch, RunConfig, RunStats};
use crate::infra::file_system::{read_file_text, walk_repository};
use crate::infra::logger::setup_logger;
use crate::infra::output::{create_writer, print_summary};
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repo2sft")]
#[command(about = "Turn a source repository into a JSONL fine-tuning corpus", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    Generate {
        #[arg(long)]
        path: PathBuf,

        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(long, default_value = "dataset")]
        name: String,

        #[arg(long, default_value = "jsonl")]
        format: String,

        #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
        system_prompt: String,

        /// Skip files under entries whose name starts with a dot
        #[arg(long)]
        skip_hidden: bool,

        /// Match excluded directories against whole path segments
        #[arg(long)]
        component_match: bool,
    },
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;

    match cli.command {
        Commands::Generate {
            path,
            output_dir,
            name,
            format,
            system_prompt,
            skip_hidden,
            component_match,
        } => {
            info!("Starting generate command");
            debug!(
                "Command parameters: path={}, output_dir={}, name={}, format={}, skip_hidden={}, component_match={}",
                path.display(),
                output_dir.display(),
                name,
                format,
                skip_hidden,
                component_match
            );

            let config = RunConfig {
                repo_path: path,
                output_dir,
                file_name: name,
                output_format: format,
                system_prompt,
            };
            let rules = ExclusionRules {
                apply_hidden_rule: skip_hidden,
                path_match: if component_match {
                    PathMatch::Component
                } else {
                    PathMatch::Substring
                },
                ..ExclusionRules::default()
            };

            let stats = generate_corpus(&config, &rules)?;
            print_summary(&stats, &config.output_path())?;
        }
    }
    Ok(())
}

/// Walks the repository, then normalizes and appends one record per eligible
/// file, in walk order.
pub fn generate_corpus(config: &RunConfig, rules: &ExclusionRules) -> anyhow::Result<RunStats> {
    let mut stats = RunStats::default();
    let root = config.repo_path.as_path();

    let output_path = config.output_path();
    // A corpus left inside the repository by an earlier run must not be read back.
    let own_output = fs::canonicalize(&output_path).ok();

    info!("Scanning for files in {}", root.display());
    let files = walk_repository(root, rules, &mut stats, own_output.as_deref())?;

    let mut writer = create_writer(&config.output_format, &output_path)?;

    info!("Converting {} files", files.len());
    for path in &files {
        let Some(content) = normalize_file(path, rules, &mut stats, read_file_text) else {
            continue;
        };

        let record = build_record(path, root, content, &config.system_prompt);
        writer.write_record(&record)?;
        stats.records_written += 1;
    }

    info!(
        "Wrote {} records ({} eligible, {} skipped)",
        stats.records_written, stats.processed_files, stats.skipped_files
    );
    Ok(stats)
}
