use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::{DedupError, FileCandidate, Result, AUDIO_EXTENSIONS};

/// Lazy walk over a directory tree yielding audio files in discovery order.
///
/// Entries below the root that cannot be read are logged and skipped. A root
/// that is missing or unreadable yields a single error and ends the walk.
pub struct Scanner {
    root: PathBuf,
    walker: walkdir::IntoIter,
    next_index: usize,
    failed: bool,
}

impl Scanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let walker = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        Self {
            root,
            walker,
            next_index: 0,
            failed: false,
        }
    }

    fn is_audio_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                AUDIO_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
    }
}

impl Iterator for Scanner {
    type Item = Result<FileCandidate>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    self.failed = true;
                    return Some(Err(DedupError::Scan {
                        path: self.root.clone(),
                        source: err,
                    }));
                }
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };

            if entry.depth() == 0 && !entry.file_type().is_dir() {
                self.failed = true;
                return Some(Err(DedupError::NotADirectory {
                    path: self.root.clone(),
                }));
            }

            if !entry.file_type().is_file() || !Self::is_audio_file(entry.path()) {
                continue;
            }

            let candidate = FileCandidate {
                index: self.next_index,
                path: entry.into_path(),
            };
            self.next_index += 1;
            return Some(Ok(candidate));
        }
    }
}
