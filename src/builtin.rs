use crate::command::{ExitCode, ShellCommand, Streams};
use crate::env::Environment;
use crate::external;
use crate::lexer::ParsedCommand;
use anyhow::Result;
use std::fmt;
use std::fs;
use thiserror::Error;
use tracing::debug;

/// The closed set of commands implemented inside the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Exit,
    Echo,
    Type,
    Pwd,
    Cd,
}

impl BuiltinKind {
    /// Every built-in, in registry order.
    pub const ALL: [BuiltinKind; 5] = [
        BuiltinKind::Exit,
        BuiltinKind::Echo,
        BuiltinKind::Type,
        BuiltinKind::Pwd,
        BuiltinKind::Cd,
    ];

    /// Canonical name of the command, e.g. "echo" or "cd".
    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::Exit => "exit",
            BuiltinKind::Echo => "echo",
            BuiltinKind::Type => "type",
            BuiltinKind::Pwd => "pwd",
            BuiltinKind::Cd => "cd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Build the command instance for an already tokenized line.
    pub(crate) fn create(self, parsed: ParsedCommand) -> Box<dyn ShellCommand> {
        match self {
            BuiltinKind::Exit => Box::new(Exit),
            BuiltinKind::Echo => Box::new(Echo {
                text: parsed.argument_text,
            }),
            BuiltinKind::Type => Box::new(Type {
                name: parsed.argument_text,
            }),
            BuiltinKind::Pwd => Box::new(Pwd),
            BuiltinKind::Cd => Box::new(Cd {
                target: parsed.argument_text,
            }),
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process. Failures a user should see are returned as [`CdError`] and
/// printed to the diagnostic stream by the blanket [`ShellCommand`] impl; any other error
/// is propagated.
pub(crate) trait BuiltinCommand: Sized {
    fn kind() -> BuiltinKind;

    /// Return value follows shell conventions: 0 for success, non-zero for error.
    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ShellCommand for T {
    fn execute(
        self: Box<Self>,
        io: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, io, env) {
            Ok(x) => Ok(x),
            Err(e) => match e.downcast_ref::<CdError>() {
                Some(user_error) => {
                    let kind = T::kind();
                    debug!(builtin = %kind, "{}", user_error);
                    writeln!(io.diagnostics, "{}", user_error)?;
                    Ok(1)
                }
                None => Err(e),
            },
        }
    }
}

/// Reasons `cd` refuses a target. The messages are what the user sees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CdError {
    #[error("cd: {0}: No such file or directory")]
    NotFound(String),
    #[error("cd: {0}: Not a directory")]
    NotADirectory(String),
}

/// Print the current working directory to standard output.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn kind() -> BuiltinKind {
        BuiltinKind::Pwd
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        writeln!(io.stdout, "{}", env.current_dir.display())?;
        Ok(0)
    }
}

/// Write the argument text followed by a newline.
pub struct Echo {
    pub text: String,
}

impl BuiltinCommand for Echo {
    fn kind() -> BuiltinKind {
        BuiltinKind::Echo
    }

    fn execute(self, io: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        writeln!(io.stdout, "{}", self.text)?;
        Ok(0)
    }
}

/// Tell whether a name is a built-in, a path, or unknown.
pub struct Type {
    pub name: String,
}

impl BuiltinCommand for Type {
    fn kind() -> BuiltinKind {
        BuiltinKind::Type
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        if BuiltinKind::from_name(&self.name).is_some() {
            writeln!(io.stdout, "{} is a shell builtin", self.name)?;
            return Ok(0);
        }
        match external::resolve(&self.name, env) {
            Some(path) => {
                writeln!(io.stdout, "{} is {}", self.name, path.display())?;
                Ok(0)
            }
            None => {
                writeln!(io.diagnostics, "{}: not found", self.name)?;
                Ok(1)
            }
        }
    }
}

/// Change the current working directory.
///
/// A target starting with `~` goes to the home directory, whatever follows the `~`. Any other target must
/// resolve (see [`external::resolve`]) and is then entered as written, relative to the current
/// directory. A target found only through `PATH` is therefore rejected.
pub struct Cd {
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn kind() -> BuiltinKind {
        BuiltinKind::Cd
    }

    fn execute(self, _io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let new_dir = if self.target.starts_with('~') {
            env.home_dir()
                .ok_or_else(|| CdError::NotFound(self.target.clone()))?
        } else {
            if external::resolve(&self.target, env).is_none() {
                return Err(CdError::NotFound(self.target).into());
            }
            env.absolute(&self.target)
        };

        let canonical =
            fs::canonicalize(&new_dir).map_err(|_| CdError::NotFound(self.target.clone()))?;
        if !canonical.is_dir() {
            return Err(CdError::NotADirectory(self.target).into());
        }

        debug!(from = %env.current_dir.display(), to = %canonical.display(), "changing directory");
        env.current_dir = canonical;
        Ok(0)
    }
}

/// Stop the read loop. Only reachable through the exact line `exit 0`.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn kind() -> BuiltinKind {
        BuiltinKind::Exit
    }

    fn execute(self, _io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        debug!("exit requested");
        env.should_exit = true;
        Ok(0)
    }
}
