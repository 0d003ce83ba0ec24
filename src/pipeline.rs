//! Scan, extract, group and export in strictly sequential phases.
//!
//! Extraction fans out over a bounded rayon pool; the phase ends only when
//! every discovered file has been attempted.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info};
use rayon::prelude::*;

use crate::analyzers::duplicate::{DuplicateGroup, DuplicateIndex};
use crate::analyzers::normalize::identity_key;
use crate::audio::metadata::{SymphoniaTagReader, TagReader};
use crate::audio::scanner::Scanner;
use crate::utils::parallel::{build_pool, default_jobs, ProgressCounter};
use crate::utils::reporting::{delimiter_byte, Reporter, DEFAULT_REPORT_NAME};
use crate::{DedupError, FileCandidate, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Extracting,
    Deduping,
    Exporting,
    Done,
    NoDuplicatesFound,
}

/// Observer for run progress. Every method has a no-op default.
pub trait ProgressReporter: Send + Sync {
    fn phase(&self, _phase: Phase) {}

    /// Called once, when scanning has finished.
    fn discovered(&self, _total: usize) {}

    /// Called after each file, `done` grows by one per call.
    fn extracted(&self, _done: usize, _total: usize) {}

    /// A file whose tags could not be read; it is kept under its file name.
    fn extraction_failed(&self, _error: &DedupError) {}
}

/// Reporter that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Report destination, overwritten if it exists.
    pub output: PathBuf,
    pub delimiter: char,
    /// Extraction worker count.
    pub jobs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_REPORT_NAME),
            delimiter: ';',
            jobs: default_jobs(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        delimiter_byte(self.delimiter).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub files_scanned: usize,
    pub extraction_failures: usize,
    pub groups: Vec<DuplicateGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Duplicates were found and the report was written.
    Written { report: PathBuf, summary: Summary },
    /// Every file had a unique key; no report was written.
    NoDuplicatesFound { summary: Summary },
}

impl Outcome {
    pub fn summary(&self) -> &Summary {
        match self {
            Outcome::Written { summary, .. } | Outcome::NoDuplicatesFound { summary } => summary,
        }
    }
}

pub struct Pipeline<R = SymphoniaTagReader> {
    config: PipelineConfig,
    reader: R,
}

impl Pipeline<SymphoniaTagReader> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_reader(config, SymphoniaTagReader::new())
    }
}

impl<R: TagReader> Pipeline<R> {
    pub fn with_reader(config: PipelineConfig, reader: R) -> Self {
        Self { config, reader }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, root: impl AsRef<Path>, progress: &dyn ProgressReporter) -> Result<Outcome> {
        self.config.validate()?;
        let root = root.as_ref();

        progress.phase(Phase::Scanning);
        info!("Scanning folder: {}", root.display());
        let candidates = self.scan(root)?;
        let files_scanned = candidates.len();
        info!("Scan complete, {} audio files found", files_scanned);
        progress.discovered(files_scanned);

        progress.phase(Phase::Extracting);
        let (index, extraction_failures) = self.extract(candidates, progress);
        info!(
            "Parsing complete, {} files without usable tags",
            extraction_failures
        );

        progress.phase(Phase::Deduping);
        let groups = index.finalize();
        info!("Found {} groups of duplicates", groups.len());

        let summary = Summary {
            files_scanned,
            extraction_failures,
            groups,
        };

        if summary.groups.is_empty() {
            progress.phase(Phase::NoDuplicatesFound);
            return Ok(Outcome::NoDuplicatesFound { summary });
        }

        progress.phase(Phase::Exporting);
        let reporter = Reporter::new(self.config.delimiter)?;
        let report = reporter.generate_duplicate_report(&summary.groups, &self.config.output)?;

        progress.phase(Phase::Done);
        Ok(Outcome::Written { report, summary })
    }

    fn scan(&self, root: &Path) -> Result<Vec<FileCandidate>> {
        Scanner::new(root).collect()
    }

    fn extract(
        &self,
        candidates: Vec<FileCandidate>,
        progress: &dyn ProgressReporter,
    ) -> (DuplicateIndex, usize) {
        let total = candidates.len();
        let index = DuplicateIndex::new();
        let counter = ProgressCounter::new();
        let failures = AtomicUsize::new(0);

        let work = || {
            candidates.into_par_iter().for_each(|candidate| {
                if !self.process(candidate, &index, progress) {
                    failures.fetch_add(1, Ordering::SeqCst);
                }
                counter.advance(|done| progress.extracted(done, total));
            });
        };

        match build_pool(self.config.jobs) {
            Some(pool) => {
                debug!("Extracting with {} workers", pool.current_num_threads());
                pool.install(work)
            }
            None => work(),
        }

        (index, failures.into_inner())
    }

    /// Records one file under its identity key. Returns false when its tags
    /// could not be read and the file name was used instead.
    fn process(
        &self,
        candidate: FileCandidate,
        index: &DuplicateIndex,
        progress: &dyn ProgressReporter,
    ) -> bool {
        let (tags, ok) = match self.reader.read_tags(&candidate.path) {
            Ok(tags) => (tags, true),
            Err(err) => {
                debug!("Falling back to file name: {}", err);
                progress.extraction_failed(&err);
                (None, false)
            }
        };

        let key = identity_key(tags.as_ref(), &candidate.path);
        debug!("{} -> {:?}", candidate.path.display(), key);
        index.record(key, candidate);
        ok
    }
}
