use crate::builtin::BuiltinKind;
use crate::command::{ExitCode, ProcessRunner, ShellCommand, Streams};
use crate::env::Environment;
use crate::external::{self, ExternalCommand, SystemRunner};
use crate::io_adapters::{LineReader, ReadOutcome};
use crate::lexer;
use anyhow::{Context, Result};
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Where a raw line is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Empty or whitespace-only line.
    Blank,
    Builtin(BuiltinKind),
    /// The first word resolved to this path.
    External(PathBuf),
    NotFound,
}

/// Ordered (pattern, built-in) pairs matched against the raw line.
///
/// The first matching entry wins; a line no entry matches goes to external lookup.
struct DispatchTable {
    rules: Vec<(Regex, BuiltinKind)>,
}

impl DispatchTable {
    const RULES: [(&'static str, BuiltinKind); 5] = [
        (r"^type ", BuiltinKind::Type),
        (r"^echo ", BuiltinKind::Echo),
        (r"^cd ", BuiltinKind::Cd),
        (r"^pwd$", BuiltinKind::Pwd),
        (r"^exit 0$", BuiltinKind::Exit),
    ];

    fn new() -> Result<Self> {
        let rules = Self::RULES
            .into_iter()
            .map(|(pattern, kind)| {
                Regex::new(pattern)
                    .with_context(|| format!("Invalid dispatch pattern: {}", pattern))
                    .map(|re| (re, kind))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    fn lookup(&self, line: &str) -> Option<BuiltinKind> {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(line))
            .map(|(_, kind)| *kind)
    }
}

/// A line-oriented shell interpreter.
///
/// Each line is matched against the built-in dispatch table; anything else is looked up on the
/// search path and, when found, handed in full to the [`ProcessRunner`].
///
/// Example
/// ```
/// use minish::{Environment, Interpreter};
/// let mut sh = Interpreter::new(Environment::new()).unwrap();
/// let mut out = Vec::new();
/// let mut diag = Vec::new();
/// sh.execute_line("echo 'hello   world'", &mut out, &mut diag).unwrap();
/// assert_eq!(out, b"hello   world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    table: DispatchTable,
    runner: Box<dyn ProcessRunner>,
}

impl Interpreter {
    /// Create an interpreter that runs external commands through the platform shell.
    pub fn new(env: Environment) -> Result<Self> {
        Self::with_runner(env, Box::new(SystemRunner))
    }

    /// Create an interpreter with a custom external-process collaborator.
    pub fn with_runner(env: Environment, runner: Box<dyn ProcessRunner>) -> Result<Self> {
        Ok(Self {
            env,
            table: DispatchTable::new()?,
            runner,
        })
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// True once `exit 0` has been executed.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Decide where `line` goes without executing anything.
    pub fn route(&self, line: &str) -> Route {
        if line.trim().is_empty() {
            return Route::Blank;
        }
        if let Some(kind) = self.table.lookup(line) {
            return Route::Builtin(kind);
        }
        let name = line.split_whitespace().next().unwrap_or_default();
        match external::resolve(name, &self.env) {
            Some(path) => Route::External(path),
            None => Route::NotFound,
        }
    }

    /// Interpret and execute one line.
    ///
    /// Results go to `stdout`, user-facing failures to `diagnostics`. Returns the exit code of
    /// the command; `Err` only for I/O failures on the streams.
    pub fn execute_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        diagnostics: &mut dyn Write,
    ) -> Result<ExitCode> {
        let route = self.route(line);
        debug!(line, route = ?route, "dispatching");

        let mut io = Streams::new(stdout, diagnostics);
        let command: Box<dyn ShellCommand + '_> = match route {
            Route::Blank => return Ok(0),
            Route::NotFound => {
                writeln!(io.diagnostics, "{}: command not found", line)?;
                return Ok(127);
            }
            Route::Builtin(kind) => {
                let parsed = lexer::tokenize(line, &self.env);
                trace!(parsed = ?parsed, "tokenized");
                kind.create(parsed)
            }
            Route::External(program) => {
                let name = line.split_whitespace().next().unwrap_or_default();
                Box::new(ExternalCommand::new(
                    name,
                    program,
                    line,
                    self.runner.as_ref(),
                ))
            }
        };

        let code = command.execute(&mut io, &mut self.env)?;
        io.stdout.flush()?;
        io.diagnostics.flush()?;
        Ok(code)
    }

    /// Read-Eval-Print Loop.
    ///
    /// Runs until `exit 0` or end of input, both of which end with status 0. An interrupted
    /// line is discarded and the prompt shown again.
    pub fn repl(
        &mut self,
        reader: &mut dyn LineReader,
        prompt: &str,
        stdout: &mut dyn Write,
        diagnostics: &mut dyn Write,
    ) -> Result<ExitCode> {
        while !self.env.should_exit {
            match reader.read_line(prompt)? {
                ReadOutcome::Line(line) => {
                    self.execute_line(&line, stdout, diagnostics)?;
                }
                ReadOutcome::Interrupted => {
                    debug!("line interrupted");
                }
                ReadOutcome::Eof => {
                    debug!("end of input");
                    break;
                }
            }
        }
        reader.finish()?;
        Ok(0)
    }
}
