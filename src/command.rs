use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Output streams handed to a command.
///
/// `stdout` receives normal results; `diagnostics` receives user-facing failure messages
/// such as `cd: foo: No such file or directory`. Both may point at the same stream.
pub struct Streams<'a> {
    pub stdout: &'a mut dyn Write,
    pub diagnostics: &'a mut dyn Write,
}

impl<'a> Streams<'a> {
    pub fn new(stdout: &'a mut dyn Write, diagnostics: &'a mut dyn Write) -> Self {
        Self {
            stdout,
            diagnostics,
        }
    }
}

/// Object-safe trait for any command the shell can execute for one input line.
///
/// Implemented by the built-ins and by [`ExternalCommand`](crate::external::ExternalCommand).
/// The returned `Err` is reserved for I/O failures on the streams; user-facing failures are
/// written to `diagnostics` and reported through the exit code.
pub trait ShellCommand {
    /// Executes the command.
    fn execute(self: Box<Self>, io: &mut Streams<'_>, env: &mut Environment)
    -> Result<ExitCode>;
}

/// Collaborator that executes a full command line as an external process and waits for it.
///
/// The interpreter only hands over the line; it does not interpret the returned status.
pub trait ProcessRunner {
    /// Run `line` with the working directory and variable overrides of `env`.
    fn run(&self, line: &str, env: &Environment) -> Result<ExitCode>;
}
