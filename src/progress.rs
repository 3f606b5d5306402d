// src/progress.rs
use std::io::Write;

/// Lightweight progress reporting used by long-running operations.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of events.
    fn begin(&mut self, _total: usize) {}

    /// One event was fully processed (some of its fights may have been skipped).
    fn item_done(&mut self, _event: &str) {}

    /// One event produced nothing because its own resource failed.
    fn item_failed(&mut self, _event: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Terminal bar on stderr: `Progress: |█████-----| 50.0% Complete`
pub struct ConsoleProgress {
    total: usize,
    done: usize,
    width: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { total: 0, done: 0, width: 50 }
    }

    fn bar(&self) -> String {
        let frac = if self.total == 0 { 1.0 } else { self.done as f64 / self.total as f64 };
        let filled = ((frac * self.width as f64) as usize).min(self.width);
        format!(
            "Progress: |{}{}| {:.1}% Complete",
            "█".repeat(filled),
            "-".repeat(self.width - filled),
            frac * 100.0
        )
    }

    fn draw(&self) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}", self.bar());
        let _ = err.flush();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self { Self::new() }
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.draw();
    }

    fn item_done(&mut self, _event: &str) {
        self.done += 1;
        self.draw();
    }

    fn item_failed(&mut self, _event: &str) {
        self.done += 1;
        self.draw();
    }

    fn finish(&mut self) {
        eprintln!();
    }
}
