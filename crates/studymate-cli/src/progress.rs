//! Stage reporting for long-running commands

use std::io::{self, IsTerminal, Write};

/// Prints numbered stages on stderr when it is a terminal
pub struct ProgressReporter {
    total: usize,
    current: usize,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            current: 0,
            enabled: io::stderr().is_terminal(),
        }
    }

    pub fn step(&mut self, msg: &str) {
        self.current += 1;
        if self.enabled {
            eprint!("\r[{}/{}] {:<50}", self.current, self.total, msg);
            io::stderr().flush().ok();
        }
    }

    pub fn finish(&self) {
        if self.enabled {
            eprintln!("\r{:<60}", "Done");
        }
    }
}
