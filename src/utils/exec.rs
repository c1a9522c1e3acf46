//! Child process helpers.
//!
//! [`Cmd`] collects a command line and runs it one of three ways:
//!
//! | Method           | Used for                 | Non-zero exit        |
//! |------------------|--------------------------|----------------------|
//! | `run`            | generator command        | error with stderr    |
//! | `probe`          | interpreter version      | returned as output   |
//! | `spawn_captured` | preview server           | left to the caller   |
//!
//! ```ignore
//! Cmd::from_slice(&["swift", "run"]).cwd(root).quiet(&SWIFT_CHATTER).run()?;
//! let child = Cmd::new("python3").args(["-m", "http.server", "8000"]).spawn_captured()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Child, Command, Output, Stdio},
    sync::OnceLock,
};

/// A command line plus where and how quietly to run it.
#[derive(Default, Debug, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    chatter: Option<&'static Chatter>,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// First element is the program, the rest are arguments.
    pub fn from_slice<S: AsRef<OsStr>>(argv: &[S]) -> Self {
        match argv.split_first() {
            Some((program, rest)) => Self::new(program).args(rest),
            None => Self::default(),
        }
    }

    /// Append an argument; empty strings are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, Self::arg)
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Hide lines matching `chatter` when echoing stderr of a successful run.
    pub fn quiet(mut self, chatter: &'static Chatter) -> Self {
        self.chatter = Some(chatter);
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Command line as typed in a shell (`python3 -m http.server 8000`).
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run to completion. A non-zero exit becomes an error carrying stderr.
    ///
    /// On success, stderr lines that are not chatter are echoed under the
    /// program's name.
    pub fn run(self) -> Result<Output> {
        let name = self.program_name();
        let output = self
            .command()
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        if !output.status.success() {
            anyhow::bail!(failure_message(&name, &output));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let chatter = self.chatter.unwrap_or(&Chatter::NONE);
        let shown: Vec<_> = chatter.keep(&stderr).collect();
        if !shown.is_empty() {
            log!(&name; "{}", shown.join("\n"));
        }
        Ok(output)
    }

    /// Run to completion and hand back the output whatever the exit status.
    pub fn probe(self) -> std::io::Result<Output> {
        self.command().output()
    }

    /// Spawn a long-lived child: stdout discarded, stderr piped.
    ///
    /// On unix the child leads its own process group, so a terminal interrupt
    /// reaches only this process. On Linux the child is also sent SIGTERM
    /// when the spawning thread dies, so an aborted session cannot leave it
    /// holding its port.
    pub fn spawn_captured(self) -> std::io::Result<Child> {
        let mut cmd = self.command();
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        #[cfg(target_os = "linux")]
        {
            use std::os::unix::process::CommandExt;
            // SAFETY: prctl is async-signal-safe and touches no shared state
            unsafe {
                cmd.pre_exec(|| {
                    if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        cmd.spawn()
    }
}

// ============================================================================
// Chatter
// ============================================================================

/// Line prefixes of routine tool output not worth echoing.
#[derive(Debug)]
pub struct Chatter {
    prefixes: &'static [&'static str],
}

impl Chatter {
    /// Nothing is chatter; every non-blank line is kept.
    pub const NONE: Self = Self::new(&[]);

    pub const fn new(prefixes: &'static [&'static str]) -> Self {
        Self { prefixes }
    }

    fn is_chatter(&self, line: &str) -> bool {
        let line = without_ansi(line);
        let line = line.trim();
        line.is_empty() || self.prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `text` worth showing.
    pub fn keep<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.lines().filter(|line| !self.is_chatter(line))
    }
}

/// Remove SGR color sequences, which compilers emit even into pipes.
pub fn without_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// `` `swift` exited with exit status: 1 `` followed by what the tool said.
///
/// stderr is preferred; stdout is used when stderr is empty, since some
/// generators print their diagnostics there.
fn failure_message(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|text| !text.is_empty());

    let headline = format!("`{name}` exited with {}", output.status);
    match detail {
        Some(detail) => format!("{headline}\n{}", without_ansi(detail)),
        None => headline,
    }
}
