//! Encoder program invocation.

use tracing::debug;

use crate::command::{CommandLine, CommandRunner};
use crate::error::{MediaError, MediaResult};

/// Encoder program used when none is configured.
pub const DEFAULT_ENCODER: &str = "ffmpeg";

/// Split a caller-supplied argument string into an argument vector.
///
/// Uses POSIX shell word rules (quotes and backslash escapes) without
/// expanding variables, globs or command separators.
pub fn parse_arguments(arguments: &str) -> MediaResult<Vec<String>> {
    shlex::split(arguments)
        .ok_or_else(|| MediaError::invalid_arguments("unbalanced quotes or trailing escape"))
}

/// Builds encoder command lines from task arguments and runs them.
#[derive(Debug, Clone)]
pub struct EncoderInvoker {
    program: String,
    runner: CommandRunner,
}

impl EncoderInvoker {
    pub fn new(program: impl Into<String>, runner: CommandRunner) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the full encoder invocation for an argument string.
    pub fn build_command(&self, arguments: &str) -> MediaResult<CommandLine> {
        let args = parse_arguments(arguments)?;
        Ok(CommandLine::new(&self.program).args(args))
    }

    /// Run the encoder with the given arguments and return its exit code.
    pub async fn invoke(&self, arguments: &str) -> MediaResult<i32> {
        let cmd = self.build_command(arguments)?;
        debug!(program = %self.program, "Invoking encoder");
        self.runner.run(&cmd).await
    }
}
