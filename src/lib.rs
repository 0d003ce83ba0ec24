use std::path::PathBuf;

pub mod analyzers;
pub mod audio;
pub mod cli;
pub mod pipeline;
pub mod utils;

/// Extensions accepted by the scanner, compared case-insensitively.
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "flac", "wav", "ogg", "m4a"];

/// A discovered audio file. `index` is its position in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub index: usize,
    pub path: PathBuf,
}

/// Artist and title read from a file's embedded tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagResult {
    pub artist: String,
    pub title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DedupError {
    #[error("Cannot scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("Failed to read tags from {}: {reason}", .path.display())]
    Extraction { path: PathBuf, reason: String },
    #[error("Invalid report delimiter {0:?}")]
    InvalidDelimiter(char),
    #[error("Failed to write report {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DedupError {
    /// Whether the error only affects a single file and the run can go on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DedupError::Extraction { .. })
    }
}

pub type Result<T> = std::result::Result<T, DedupError>;

// Re-exports for convenience
pub use analyzers::duplicate::{DuplicateGroup, DuplicateIndex};
pub use analyzers::normalize::{identity_key, normalize};
pub use audio::metadata::{SymphoniaTagReader, TagReader};
pub use audio::scanner::Scanner;
pub use pipeline::{NoProgress, Outcome, Phase, Pipeline, PipelineConfig, ProgressReporter, Summary};
pub use utils::reporting::Reporter;
