//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: a spinner status line plus the terminal title, both restored
//! when the [`StatusLine`] guard drops.
//! Non-TTY mode: no status display; logs are the only progress indicator.

use std::io::{IsTerminal, Write};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// xterm title stack: save current title / restore saved title
const TITLE_PUSH: &str = "\x1b[22;0t";
const TITLE_POP: &str = "\x1b[23;0t";

/// Central progress context owning the indicatif `MultiProgress`.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        Self::with_tty(std::io::stderr().is_terminal())
    }

    /// Create a context with an explicit TTY decision.
    pub fn with_tty(is_tty: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Acquire the status display for the duration of a run.
    ///
    /// The returned guard restores the terminal (spinner cleared, previous
    /// window title popped) when dropped, on success and error paths alike.
    pub fn status_line(&self, name: &str) -> StatusLine {
        if !self.is_tty {
            return StatusLine {
                bar: ProgressBar::hidden(),
                owns_title: false,
            };
        }

        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {prefix:<10.cyan.bold} {wide_msg}")
                .expect("invalid template"),
        );
        bar.set_prefix(name.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        write_terminal(TITLE_PUSH);
        StatusLine {
            bar,
            owns_title: true,
        }
    }

    /// Print a line to stdout without tearing the status spinner.
    pub fn println(&self, msg: impl AsRef<str>) {
        let msg = msg.as_ref();
        if self.is_tty {
            self.multi.suspend(|| println!("{msg}"));
        } else {
            println!("{msg}");
        }
    }

    /// Whether running in TTY mode.
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped status display (spinner line + terminal title).
pub struct StatusLine {
    bar: ProgressBar,
    owns_title: bool,
}

impl StatusLine {
    /// Show `status` on the spinner and in the window title.
    pub fn set(&self, status: &str) {
        self.bar.set_message(status.to_string());
        if self.owns_title {
            write_terminal(&format!("\x1b]0;{status}\x07"));
        }
    }

    #[cfg(test)]
    fn message(&self) -> String {
        self.bar.message()
    }
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
        if self.owns_title {
            write_terminal(TITLE_POP);
        }
    }
}

fn write_terminal(seq: &str) {
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(seq.as_bytes());
    let _ = stderr.flush();
}

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
