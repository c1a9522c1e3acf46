use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::utils::exec::Cmd;

/// Python module serving the current directory over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpModule {
    /// Python 3
    HttpServer,
    /// Python 2
    SimpleHttpServer,
}

impl HttpModule {
    /// Module for an interpreter major version. Unknown versions get the
    /// Python 2 module.
    pub fn for_major(major: Option<u32>) -> Self {
        match major {
            Some(major) if major >= 3 => Self::HttpServer,
            _ => Self::SimpleHttpServer,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::HttpServer => "http.server",
            Self::SimpleHttpServer => "SimpleHTTPServer",
        }
    }
}

/// Placeholder replaced by the port in custom server commands.
pub const PORT_PLACEHOLDER: &str = "{port}";

/// Command line of the preview server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    /// `<interpreter> -m <module> <port>`
    Python {
        interpreter: PathBuf,
        module: HttpModule,
    },
    /// User-supplied command; `{port}` in any argument is substituted.
    Custom(Vec<String>),
}

impl ServerCommand {
    /// Pick the Python server module by probing `interpreter`'s version.
    pub fn detect(interpreter: &str) -> Self {
        let resolved = which::which(interpreter).unwrap_or_else(|_| PathBuf::from(interpreter));
        let major = probe_major_version(&resolved);
        let module = HttpModule::for_major(major);

        crate::debug!(
            "server";
            "{} reports major version {:?}, using {}",
            resolved.display(),
            major,
            module.name()
        );

        Self::Python {
            interpreter: resolved,
            module,
        }
    }

    /// Command to run in `output_dir`, listening on `port`.
    pub fn to_cmd(&self, output_dir: &Path, port: u16) -> Cmd {
        let port = port.to_string();
        let cmd = match self {
            Self::Python {
                interpreter,
                module,
            } => Cmd::new(interpreter).args(["-m", module.name(), port.as_str()]),
            Self::Custom(command) => {
                let command: Vec<_> = command
                    .iter()
                    .map(|arg| arg.replace(PORT_PLACEHOLDER, &port))
                    .collect();
                Cmd::from_slice(&command)
            }
        };
        cmd.cwd(output_dir)
    }
}

/// Ask the interpreter for its version; `None` when it cannot be determined.
pub fn probe_major_version(interpreter: &Path) -> Option<u32> {
    let output = Cmd::new(interpreter).arg("--version").probe().ok()?;
    // Python 2 prints its version on stderr
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    parse_major_version(&text)
}

/// Extract the major version from `Python X.Y.Z` output.
pub fn parse_major_version(text: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"Python[ \t]+([0-9]+)\.").unwrap());
    re.captures(text)?.get(1)?.as_str().parse().ok()
}
