//! Package-manager subprocess invocation.
//!
//! Every call reports one of three outcomes through [`Invocation`]. A non-zero
//! exit is not an error here: `npm outdated` and `npm audit` both exit with
//! status 1 when they have findings, with the JSON payload still on stdout.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Result of running one package-manager command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// The process could not be started, or did not finish in time.
    LaunchFailure(String),
    /// The process ran and exited non-zero.
    NonZeroExit { code: Option<i32>, stdout: String },
    /// The process ran and exited with status 0.
    Success(String),
}

/// The package-manager operations the collector needs.
pub trait PackageManager {
    /// `outdated --json`, run in `project_dir`.
    fn outdated(&self, project_dir: &Path) -> Invocation;

    /// `audit --json`, run in `project_dir`.
    fn audit(&self, project_dir: &Path) -> Invocation;

    /// Human-readable form of the command behind `outdated`/`audit`.
    fn describe(&self, subcommand: &str) -> String;

    /// Version string of the package manager itself.
    fn version(&self) -> Option<String>;

    /// Version string of the JavaScript runtime.
    fn runtime_version(&self) -> Option<String>;
}

/// The `npm` command-line client.
#[derive(Debug, Clone)]
pub struct NpmCli {
    program: String,
    timeout: Option<Duration>,
}

impl NpmCli {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn json_subcommand(&self, subcommand: &str, project_dir: &Path) -> Invocation {
        run(
            &self.program,
            &[subcommand, "--json", "--silent"],
            Some(project_dir),
            self.timeout,
        )
    }
}

impl PackageManager for NpmCli {
    fn outdated(&self, project_dir: &Path) -> Invocation {
        self.json_subcommand("outdated", project_dir)
    }

    fn audit(&self, project_dir: &Path) -> Invocation {
        self.json_subcommand("audit", project_dir)
    }

    fn describe(&self, subcommand: &str) -> String {
        format!("{} {} --json --silent", self.program, subcommand)
    }

    fn version(&self) -> Option<String> {
        version_of(&self.program, "-v", self.timeout)
    }

    fn runtime_version(&self) -> Option<String> {
        version_of("node", "--version", self.timeout)
    }
}

fn version_of(program: &str, flag: &str, timeout: Option<Duration>) -> Option<String> {
    match run(program, &[flag], None, timeout) {
        Invocation::Success(out) => {
            let version = out.trim();
            (!version.is_empty()).then(|| version.to_string())
        }
        _ => None,
    }
}

/// Locate `program` on `PATH`, or as given when it contains a path separator.
fn resolve_program(program: &str) -> Result<PathBuf, String> {
    which::which(program).map_err(|e| format!("cannot locate `{program}`: {e}"))
}

/// Run `program` non-interactively: stdin closed, stderr discarded, stdout
/// captured. Stdout is drained on a helper thread so a large payload cannot
/// stall the child while the timeout is being enforced.
pub fn run(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout: Option<Duration>,
) -> Invocation {
    let resolved = match resolve_program(program) {
        Ok(path) => path,
        Err(reason) => {
            warn!("{reason}");
            return Invocation::LaunchFailure(reason);
        }
    };

    let mut command = Command::new(&resolved);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    debug!(program = %resolved.display(), ?args, ?cwd, "spawning");

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            let reason = format!("failed to start `{program}`: {e}");
            warn!("{reason}");
            return Invocation::LaunchFailure(reason);
        }
    };

    let reader = child.stdout.take().map(|mut out| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = out.read_to_end(&mut buf);
            buf
        })
    });

    let status = match wait(&mut child, timeout) {
        Ok(status) => status,
        Err(reason) => {
            warn!("{reason}");
            // Not joined: a grandchild may still hold the pipe open. The
            // reader exits on its own once the last writer is gone.
            drop(reader);
            return Invocation::LaunchFailure(reason);
        }
    };

    let bytes = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    let stdout = String::from_utf8_lossy(&bytes).into_owned();

    debug!(program, code = ?status.code(), bytes = bytes.len(), "exited");

    if status.success() {
        Invocation::Success(stdout)
    } else {
        Invocation::NonZeroExit {
            code: status.code(),
            stdout,
        }
    }
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus, String> {
    let Some(timeout) = timeout else {
        return child.wait().map_err(|e| format!("failed to wait for process: {e}"));
    };

    match child.wait_timeout(timeout) {
        Ok(Some(status)) => Ok(status),
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(format!("timed out after {timeout:?}"))
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(format!("failed to wait for process: {e}"))
        }
    }
}
