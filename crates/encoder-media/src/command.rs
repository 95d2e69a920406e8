//! Command builder and runner for external programs.

use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, info_span, warn, Instrument, Span};

use crate::error::{MediaError, MediaResult};

/// Placeholder printed in logs instead of secret arguments.
const REDACTED: &str = "***";

/// An external program invocation as an argument vector.
///
/// Arguments are handed to the program directly, never through a shell.
#[derive(Debug, Clone)]
pub struct CommandLine {
    /// Program name or path
    program: String,
    /// Arguments passed to the program
    args: Vec<String>,
    /// Indexes into `args` that must not be logged
    secret: Vec<usize>,
}

impl CommandLine {
    /// Create a new command line for a program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an argument that is redacted when the command is displayed.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret.contains(&i) {
                write!(f, " {}", REDACTED)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of one command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Command line as displayed in logs
    pub command: String,
    /// Process exit code
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs to completion and logs what they produced.
///
/// Each runner carries its own span so that every event it emits is tagged
/// with the component that owns it.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    /// Span attached to every event emitted by this runner
    span: Span,
    /// Optional wall-clock limit per invocation
    timeout: Option<Duration>,
}

impl CommandRunner {
    /// Create a runner whose log events are tagged with `component`.
    pub fn new(component: &str) -> Self {
        Self::with_span(info_span!("command", component = %component))
    }

    /// Create a runner that logs inside the given span.
    pub fn with_span(span: Span) -> Self {
        Self {
            span,
            timeout: None,
        }
    }

    /// Set timeout. `None` waits for the program indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run a command and return its exit code.
    ///
    /// A non-zero exit code is returned as `Ok`. Only failing to start the
    /// program, losing its pipes or exceeding the timeout is an error.
    pub async fn run(&self, cmd: &CommandLine) -> MediaResult<i32> {
        self.capture(cmd).await.map(|output| output.exit_code)
    }

    /// Run a command and return everything it produced.
    pub async fn capture(&self, cmd: &CommandLine) -> MediaResult<CommandOutput> {
        self.execute(cmd).instrument(self.span.clone()).await
    }

    async fn execute(&self, cmd: &CommandLine) -> MediaResult<CommandOutput> {
        let command_line = cmd.to_string();
        info!(command = %command_line, "Running command");

        // kill_on_drop: a timed out or cancelled invocation takes its child down with it
        let child = Command::new(cmd.program())
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::spawn(cmd.program(), e))?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        command = %command_line,
                        "Command timed out after {:?}, killing process",
                        limit
                    );
                    return Err(MediaError::Timeout(limit));
                }
            },
            None => child.wait_with_output().await?,
        };

        let result = CommandOutput {
            command: command_line,
            exit_code: exit_code(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        };
        log_output(&result);

        Ok(result)
    }
}

fn log_output(output: &CommandOutput) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.success() {
        info!(command = %output.command, exit_code = output.exit_code, "Command finished");
    } else {
        warn!(command = %output.command, exit_code = output.exit_code, "Command failed");
    }
    info!(stdout = %stdout.trim_end(), "Command stdout");
    info!(stderr = %stderr.trim_end(), "Command stderr");
}

/// Map an exit status to a shell-style exit code.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            debug!(signal, "Process terminated by signal");
            return 128 + signal;
        }
    }

    -1
}

/// Check if a program is available.
pub fn check_program(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::ProgramNotFound(program.to_string()))
}
