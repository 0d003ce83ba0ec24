use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::FileCandidate;

/// Files sharing one identity key, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub key: String,
    pub paths: Vec<PathBuf>,
}

/// Key to file list accumulator for a single pipeline run.
///
/// `record` may be called from many worker threads at once. `finalize`
/// consumes the index, so nothing can be recorded after export starts.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    entries: Mutex<HashMap<String, Vec<FileCandidate>>>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: String, candidate: FileCandidate) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.entry(key).or_default().push(candidate);
    }

    /// Number of distinct keys recorded so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Groups with at least two files, sorted by key. Paths inside a group
    /// follow discovery order regardless of which worker finished first.
    pub fn finalize(self) -> Vec<DuplicateGroup> {
        let entries = self
            .entries
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut groups: Vec<DuplicateGroup> = entries
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(key, mut files)| {
                files.sort_by_key(|c| c.index);
                DuplicateGroup {
                    key,
                    paths: files.into_iter().map(|c| c.path).collect(),
                }
            })
            .collect();

        groups.sort_by(|a, b| a.key.cmp(&b.key));
        groups
    }
}
