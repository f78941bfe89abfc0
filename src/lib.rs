//! A small interactive shell.
//!
//! Each input line goes through a short pipeline: a quote-aware tokenizer splits it into a
//! command name and argument text, a dispatch table picks one of the built-ins (`exit`, `echo`,
//! `type`, `pwd`, `cd`), and anything else is looked up on the search path and handed to an
//! external-process runner.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`] and [`env`] expose
//! the traits and state it is built on, so callers can swap the process runner or drive the
//! interpreter from a scripted line source.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
mod external;
mod interpreter;
pub mod io_adapters;
mod lexer;

pub use builtin::{BuiltinKind, CdError};
pub use env::Environment;
pub use external::{SystemRunner, resolve};
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, Route};
pub use lexer::{ParsedCommand, group_quotes, tokenize};
