use std::io;
use std::process::ExitCode;

use audio_dedup::cli::commands::Cli;
use audio_dedup::cli::progress::ConsoleProgress;
use audio_dedup::cli::prompt::confirm;
use audio_dedup::{Outcome, Pipeline};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let folder = cli.folder();

    if !cli.yes {
        let stdin = io::stdin();
        match confirm(&folder, &mut stdin.lock(), &mut io::stdout()) {
            Ok(true) => println!(),
            Ok(false) => return ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("🛑 Could not read answer: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let pipeline = Pipeline::new(cli.pipeline_config());
    log::info!("Using {} worker threads", pipeline.config().jobs);

    match pipeline.run(&folder, &ConsoleProgress::new()) {
        Ok(Outcome::Written { report, summary }) => {
            println!(
                "ℹ️ {} duplicate groups across {} files ({} without readable tags).",
                summary.groups.len(),
                summary.files_scanned,
                summary.extraction_failures
            );
            println!("ℹ️ Report written to: {}", report.display());
            ExitCode::SUCCESS
        }
        Ok(Outcome::NoDuplicatesFound { summary }) => {
            println!("ℹ️ Checked {} files, nothing to report.", summary.files_scanned);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("🛑 {}", e);
            ExitCode::FAILURE
        }
    }
}
