//! Progress output for user-facing status updates.
//!
//! Batches report each rename, skip and lookup here. In verbose mode output is
//! suppressed since tracing handles everything. In normal mode it is shown on
//! stderr, colored when the terminal allows it.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Progress reporter for user-facing output
pub struct Progress {
    writer: Box<dyn Write>,
    /// When true, all output is suppressed (verbose mode uses tracing instead)
    silent: bool,
    /// When true, output is colorized
    colors_enabled: bool,
}

/// Check if we should use colors in output
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    io::stderr().is_terminal()
}

impl Progress {
    /// Create a progress reporter writing to stderr.
    /// When verbose=true, output is suppressed (tracing handles it)
    pub fn new(verbose: bool) -> Self {
        Self {
            writer: Box::new(io::stderr()),
            silent: verbose,
            colors_enabled: should_use_colors(),
        }
    }

    /// Create a progress reporter with a custom writer (for testing)
    #[cfg(test)]
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            silent: false,
            colors_enabled: false,
        }
    }

    /// Create a silent progress reporter
    pub fn silent() -> Self {
        Self {
            writer: Box::new(io::sink()),
            silent: true,
            colors_enabled: false,
        }
    }

    /// Announce a batch
    pub fn batch_start(&mut self, total: usize, description: &str) {
        if self.silent {
            return;
        }
        let line = format!("{}: {} items", description, total);
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", line.bold());
        } else {
            let _ = writeln!(self.writer, "{}", line);
        }
    }

    /// Report progress on a single rename
    pub fn rename_progress(&mut self, current: usize, total: usize, from: &str, to: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {} {}",
                counter.cyan(),
                from.dimmed(),
                "→".cyan(),
                to
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} -> {}", current, total, from, to);
        }
    }

    /// Report an item that was left alone
    pub fn skipped(&mut self, current: usize, total: usize, name: &str, reason: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {}",
                counter.cyan(),
                name.dimmed(),
                format!("(skipped: {})", reason).dimmed()
            );
        } else {
            let _ = writeln!(
                self.writer,
                "[{}/{}] {} (skipped: {})",
                current, total, name, reason
            );
        }
    }

    /// Report a station name turned into a code
    pub fn resolved(&mut self, name: &str, code: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{} {}",
                format!("{} is", name).dimmed(),
                code.green()
            );
        } else {
            let _ = writeln!(self.writer, "{} is {}", name, code);
        }
    }

    /// Report an error during operation (non-fatal)
    pub fn warn(&mut self, message: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.writer, "Warning: {}", message);
        }
    }

    /// Report code cache written
    pub fn cache_saved(&mut self, path: &Path) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("Code cache saved to: {}", path.display()).dimmed()
            );
        } else {
            let _ = writeln!(self.writer, "Code cache saved to: {}", path.display());
        }
    }

    /// Report batch complete
    pub fn batch_complete(&mut self, count: usize, dry_run: bool) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        if dry_run {
            if self.colors_enabled {
                let _ = writeln!(
                    self.writer,
                    "{}",
                    format!("Dry run complete. {} files would be renamed.", count).dimmed()
                );
            } else {
                let _ = writeln!(
                    self.writer,
                    "Dry run complete. {} files would be renamed.",
                    count
                );
            }
        } else if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{} {}",
                "✓".green().bold(),
                format!("{} files renamed", count).green()
            );
        } else {
            let _ = writeln!(self.writer, "Done. {} files renamed.", count);
        }
    }
}
