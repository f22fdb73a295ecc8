//! Process execution.
//!
//! Commands are run from an argument vector (no shell) unless the spec
//! asks for a shell. Output is always captured; a timeout kills the child
//! and reports [`IrequireError::TimedOut`].

use crate::error::{IrequireError, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// How often a child with a deadline is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }
}

/// A fully substituted command ready to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program followed by its arguments.
    pub argv: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Join `argv` with spaces and hand it to the platform shell.
    pub shell: bool,

    /// Extra environment variables (merged with the inherited env).
    pub env: BTreeMap<String, String>,

    /// Kill the command if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Create a spec from an argument vector.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the time limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The program name (first token), if any.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Human-readable command line for logs and error messages.
    pub fn display(&self) -> String {
        if self.shell {
            self.argv.join(" ")
        } else {
            shell_words::join(&self.argv)
        }
    }
}

/// Executes command specs. The process-execution collaborator.
pub trait ProcessRunner {
    /// Run a command to completion.
    ///
    /// A non-zero exit is not an error here: it is reported through
    /// [`CommandResult::success`]. Errors mean the command could not be
    /// run or was killed after its timeout.
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;
}

impl<F> ProcessRunner for F
where
    F: Fn(&CommandSpec) -> Result<CommandResult>,
{
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        self(spec)
    }
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a system runner.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let start = Instant::now();
        let command_line = spec.display();
        let mut cmd = build_command(spec)?;

        tracing::debug!("EXEC: {}", command_line);

        let mut child = cmd.spawn().map_err(|e| IrequireError::CommandFailed {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

        let stdout = Capture::start(child.stdout.take());
        let stderr = Capture::start(child.stderr.take());

        let status = match spec.timeout {
            None => child.wait()?,
            Some(limit) => match wait_with_deadline(&mut child, limit)? {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    // Grandchildren may still hold the pipes open, so read
                    // what has arrived instead of joining the readers.
                    let mut output = stdout.snapshot();
                    output.push_str(&stderr.snapshot());
                    tracing::debug!("TIMEOUT after {:?}: {}", limit, command_line);
                    return Err(IrequireError::TimedOut {
                        command: command_line,
                        timeout: limit,
                        output,
                    });
                }
            },
        };

        let stdout = stdout.finish();
        let stderr = stderr.finish();
        let duration = start.elapsed();

        if status.success() {
            Ok(CommandResult::success(stdout, stderr, duration))
        } else {
            Ok(CommandResult::failure(
                status.code(),
                stdout,
                stderr,
                duration,
            ))
        }
    }
}

fn build_command(spec: &CommandSpec) -> Result<Command> {
    let mut cmd = if spec.shell {
        let script = spec.argv.join(" ");
        let (shell, flag) = shell_program();
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(script);
        cmd
    } else {
        let (program, args) =
            spec.argv
                .split_first()
                .ok_or_else(|| IrequireError::CommandFailed {
                    command: String::new(),
                    message: "empty command line".to_string(),
                })?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    };

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    Ok(cmd)
}

/// The shell used for `shell: true` recipes.
fn shell_program() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("/bin/sh", "-c")
    }
}

/// Output of one pipe, collected on a reader thread.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    reader: thread::JoinHandle<()>,
}

impl Capture {
    fn start<R>(pipe: Option<R>) -> Self
    where
        R: Read + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let reader = thread::spawn(move || {
            let Some(mut pipe) = pipe else {
                return;
            };
            let mut chunk = [0u8; 4096];
            loop {
                match pipe.read(&mut chunk) {
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                }
            }
        });
        Self { buf, reader }
    }

    /// Everything read so far.
    fn snapshot(&self) -> String {
        Self::snapshot_of(&self.buf)
    }

    /// Wait for the pipe to close and return the whole output.
    fn finish(self) -> String {
        let Self { buf, reader } = self;
        let _ = reader.join();
        Self::snapshot_of(&buf)
    }

    fn snapshot_of(buf: &Mutex<Vec<u8>>) -> String {
        buf.lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }
}

/// Wait for the child until `limit` elapses. `None` means it is still running.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
