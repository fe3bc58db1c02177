//! Console reporting for parallel file operations
//!
//! Worker threads share one [`Reporter`]. A mutex serializes output so
//! interleaved tasks never shred each other's lines, and the same lock
//! guards the running tally that the command summaries print at the end.

use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use colored::Colorize;

/// Counts of file operation outcomes accumulated by a [`Reporter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub copied: usize,
    pub up_to_date: usize,
    pub failed: usize,
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} copied, {} up to date, {} failed",
            self.copied, self.up_to_date, self.failed
        )
    }
}

/// Thread-safe progress printer.
#[derive(Debug, Default)]
pub struct Reporter {
    state: Mutex<Tally>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints an uncounted status line.
    pub fn note(&self, message: &str) {
        let _guard = self.state.lock().unwrap();
        println!("{message}");
    }

    /// Prints an uncounted warning line in red.
    pub fn skipped(&self, message: &str) {
        let _guard = self.state.lock().unwrap();
        println!("{}", message.red());
    }

    pub fn copied(&self, src: &Path, dst: &Path) {
        let mut tally = self.state.lock().unwrap();
        tally.copied += 1;
        let line = format!(">> copy {} -> {}", src.display(), dst.display());
        println!("{}", line.green());
    }

    pub fn up_to_date(&self, dst: &Path) {
        let mut tally = self.state.lock().unwrap();
        tally.up_to_date += 1;
        let line = format!(">> up to date: {}", dst.display());
        println!("{}", line.green());
    }

    pub fn failed(&self, context: &str, error: &dyn fmt::Display) {
        let mut tally = self.state.lock().unwrap();
        tally.failed += 1;
        let line = format!(">> {context}: {error}");
        println!("{}", line.red());
    }

    /// Snapshot of the counts so far.
    pub fn tally(&self) -> Tally {
        *self.state.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_tally_accumulates_outcomes() {
        let reporter = Reporter::new();
        let src = PathBuf::from("a.c");
        let dst = PathBuf::from("b.c");
        reporter.copied(&src, &dst);
        reporter.copied(&src, &dst);
        reporter.up_to_date(&dst);
        reporter.failed("copy a.c", &"permission denied");
        let tally = reporter.tally();
        assert_eq!(tally.copied, 2);
        assert_eq!(tally.up_to_date, 1);
        assert_eq!(tally.failed, 1);
    }

    #[test]
    fn test_notes_do_not_count() {
        let reporter = Reporter::new();
        reporter.note("finding spl");
        reporter.skipped("outside the project tree");
        assert_eq!(reporter.tally(), Tally::default());
    }

    #[test]
    fn test_tally_display() {
        let tally = Tally {
            copied: 3,
            up_to_date: 1,
            failed: 0,
        };
        assert_eq!(tally.to_string(), "3 copied, 1 up to date, 0 failed");
    }

    #[test]
    fn test_shared_across_threads() {
        let reporter = Reporter::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        reporter.up_to_date(Path::new("x.h"));
                    }
                });
            }
        });
        assert_eq!(reporter.tally().up_to_date, 100);
    }
}
