//! Terminal output.
//!
//! - `log!("module"; ...)`: `[module] message` on stdout, prefix colored by module
//! - `debug!("module"; ...)`: same, only with `--verbose`
//! - `error!(...)`: `❌ message` on stderr
//! - [`BuildStatus`]: the rebuild line that "regenerating..." turns into
//!   "✓ regenerated in 1.2s"
//!
//! ```ignore
//! log!("serve"; "http://localhost:{}", port);
//! error!("Regeneration failed: {}", err);
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{AnsiColors, OwoColorize};
use parking_lot::Mutex;
use std::{
    io::{Write, stderr, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

/// Set from `--verbose` before anything is logged
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

// ============================================================================
// Macros
// ============================================================================

/// `log!("watch"; "modified: {}", path)`
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`. Arguments are not evaluated otherwise.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// `❌`-prefixed line on stderr.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        $crate::logger::error(&format!($($arg)*))
    }};
}

// ============================================================================
// Writers
// ============================================================================

pub fn log(module: &str, message: &str) {
    // Anything printed now sits below the status line; keep it on screen
    status_detach();

    let prefix = format!("[{module}]");
    let mut out = stdout().lock();
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{} {message}", prefix.color(module_color(module)).bold()).ok();
    out.flush().ok();
}

pub fn error(message: &str) {
    status_detach();

    let mut err = stderr().lock();
    writeln!(err, "❌ {}", message.red()).ok();
    err.flush().ok();
}

fn module_color(module: &str) -> AnsiColors {
    match module {
        "serve" | "server" => AnsiColors::BrightBlue,
        "watch" => AnsiColors::BrightGreen,
        "build" => AnsiColors::BrightMagenta,
        "error" => AnsiColors::BrightRed,
        _ => AnsiColors::BrightYellow,
    }
}

// ============================================================================
// BuildStatus
// ============================================================================

/// The rebuild status block.
///
/// `progress` prints a dimmed notice that `success` overwrites in place, so
/// a long session shows one line per rebuild. Output from `log`/`error`
/// detaches the block first, so it never erases anything else.
pub struct BuildStatus {
    /// Height of the block currently on screen, 0 when detached
    last_lines: usize,
}

static BUILD_STATUS: LazyLock<Mutex<BuildStatus>> =
    LazyLock::new(|| Mutex::new(BuildStatus::new()));

impl BuildStatus {
    pub const fn new() -> Self {
        Self { last_lines: 0 }
    }

    pub fn progress(&mut self, message: &str) {
        self.replace(&message.dimmed().to_string());
    }

    pub fn success(&mut self, elapsed: Duration) {
        let line = format!("{} regenerated in {}", "✓".green(), format_elapsed(elapsed));
        self.replace(&line);
    }

    pub fn detach(&mut self) {
        self.last_lines = 0;
    }

    fn replace(&mut self, text: &str) {
        let mut out = stdout().lock();

        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let up = self.last_lines as u16;
            execute!(out, cursor::MoveUp(up), Clear(ClearType::FromCursorDown)).ok();
        }
        writeln!(out, "{text}").ok();
        out.flush().ok();

        self.last_lines = line_count(text);
    }
}

pub fn status_progress(message: &str) {
    BUILD_STATUS.lock().progress(message);
}

pub fn status_success(elapsed: Duration) {
    BUILD_STATUS.lock().success(elapsed);
}

pub fn status_detach() {
    BUILD_STATUS.lock().detach();
}

fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// `250ms` below a second, `2.5s` above.
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_starts_detached() {
        assert_eq!(BuildStatus::new().last_lines, 0);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count("regenerated in 12ms"), 1);
        assert_eq!(line_count("error: boom\n  --> main.swift:3\n"), 3);
    }

    #[test]
    fn test_detach_forgets_block() {
        let mut status = BuildStatus { last_lines: 4 };
        status.detach();
        assert_eq!(status.last_lines, 0);
    }

    #[test]
    fn test_module_colors() {
        assert_eq!(module_color("watch"), AnsiColors::BrightGreen);
        assert_eq!(module_color("serve"), AnsiColors::BrightBlue);
        assert_eq!(module_color("swift"), AnsiColors::BrightYellow);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(250)), "250ms");
        assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
    }
}
