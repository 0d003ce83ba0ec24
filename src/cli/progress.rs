use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::pipeline::{Phase, ProgressReporter};
use crate::DedupError;

const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Prints phase changes and a throttled `done/total` counter to stdout.
pub struct ConsoleProgress {
    last_print: Mutex<Option<Instant>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            last_print: Mutex::new(None),
        }
    }

    fn should_print(&self, done: usize, total: usize) -> bool {
        if done == total {
            return true;
        }
        let mut last = self
            .last_print
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        match *last {
            Some(at) if now.duration_since(at) < REFRESH_INTERVAL => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn phase(&self, phase: Phase) {
        match phase {
            Phase::Scanning => println!("⏳ Scanning folder..."),
            Phase::Extracting => println!("⏳ Parsing files..."),
            Phase::Deduping => println!("⏳ Scanning for duplicates..."),
            Phase::Exporting => println!("⏳ Converting data into CSV..."),
            Phase::Done => println!("✅ Done!"),
            Phase::NoDuplicatesFound => println!("ℹ️ No duplicates found."),
        }
    }

    fn discovered(&self, total: usize) {
        println!("ℹ️ Scan complete. {} audio files found.", total);
    }

    fn extracted(&self, done: usize, total: usize) {
        if self.should_print(done, total) {
            println!("⚙️ {}/{}", done, total);
        }
    }

    fn extraction_failed(&self, error: &DedupError) {
        eprintln!("🛑 {}", error);
    }
}
