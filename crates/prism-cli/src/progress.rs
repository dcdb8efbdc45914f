use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};
use prism_jobs::JobProgress;

use crate::cli::GlobalFlags;

/// Terminal progress bar driven by a job. Does nothing in quiet mode.
pub struct Progress {
    bar: Option<ProgressBar>,
}

fn terminal_columns() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
}

fn bar_template() -> &'static str {
    match terminal_columns() {
        Some(cols) if cols >= 110 => "{prefix} {bar:40.cyan/blue} {pos}/{len} {msg}",
        Some(cols) if cols >= 80 => "{prefix} {wide_bar:.cyan/blue} {pos}/{len} {msg}",
        _ => "{prefix} {wide_bar:.cyan/blue} {percent}%",
    }
}

/// Bars are drawn only on an interactive stderr outside quiet mode.
pub fn enabled(flags: &GlobalFlags) -> bool {
    !flags.quiet && std::io::stderr().is_terminal()
}

impl Progress {
    #[must_use]
    pub fn bar(enabled: bool, prefix: &str) -> Self {
        if !enabled {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_prefix(prefix.to_string());
        Self { bar: Some(bar) }
    }
}

impl JobProgress for Progress {
    fn begin(&self, total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_length(total as u64);
            bar.set_position(0);
        }
    }

    fn step(&self, label: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(label.to_string());
            bar.inc(1);
        }
    }

    fn end(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
