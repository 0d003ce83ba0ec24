use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::PipelineConfig;
use crate::utils::parallel::default_jobs;
use crate::utils::reporting::DEFAULT_REPORT_NAME;

#[derive(Parser, Debug)]
#[command(name = "audio-dedup")]
#[command(version)]
#[command(about = "Find duplicate audio files by their artist and title tags", long_about = None)]
pub struct Cli {
    /// Directory to scan for duplicates (defaults to the current directory)
    #[arg(value_name = "FOLDER", env = "FOLDER_TO_SCAN")]
    pub folder: Option<PathBuf>,

    /// Report file to write
    #[arg(short = 'o', long, default_value = DEFAULT_REPORT_NAME)]
    pub output: PathBuf,

    /// Field delimiter used in the report
    #[arg(short = 'd', long, default_value_t = ';')]
    pub delimiter: char,

    /// Number of worker threads used to read tags (defaults to the CPU count)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Start without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Folder to scan, falling back to the working directory.
    pub fn folder(&self) -> PathBuf {
        self.folder
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            output: self.output.clone(),
            delimiter: self.delimiter,
            jobs: self.jobs.unwrap_or_else(default_jobs),
        }
    }
}
