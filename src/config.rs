use argh::FromArgs;
use std::path::PathBuf;

/// Prompt shown before each line when none is configured.
pub const DEFAULT_PROMPT: &str = "$ ";

#[derive(FromArgs, Debug)]
/// A small interactive shell with quoting, a few built-ins and PATH lookup.
pub struct Args {
    #[argh(option, short = 'c')]
    /// run a single command line and exit
    pub command: Option<String>,

    #[argh(option)]
    /// prompt shown before each line (default: "$ ")
    pub prompt: Option<String>,

    #[argh(option)]
    /// file to load line-editor history from and save it to
    pub history: Option<PathBuf>,

    #[argh(switch)]
    /// write diagnostics such as "command not found" to stderr instead of stdout
    pub stderr_diagnostics: bool,

    #[argh(option)]
    /// tracing filter directive, e.g. "minish=debug" (overrides RUST_LOG)
    pub log: Option<String>,
}

/// How the diagnostic stream is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStream {
    Stdout,
    Stderr,
}

/// Runtime settings of the shell binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub history: Option<PathBuf>,
    pub diagnostics: DiagnosticStream,
    /// A single line to run instead of reading interactively.
    pub command: Option<String>,
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: DEFAULT_PROMPT.to_string(),
            history: None,
            diagnostics: DiagnosticStream::Stdout,
            command: None,
            log_filter: None,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let defaults = Config::default();
        Config {
            prompt: args.prompt.unwrap_or(defaults.prompt),
            history: args.history,
            diagnostics: if args.stderr_diagnostics {
                DiagnosticStream::Stderr
            } else {
                DiagnosticStream::Stdout
            },
            command: args.command,
            log_filter: args.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Args::from_args(&["minish"], args)
            .expect("arguments should parse")
            .into()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]), Config::default());
        assert_eq!(Config::default().prompt, "$ ");
    }

    #[test]
    fn test_all_options() {
        let config = parse(&[
            "-c",
            "echo hi",
            "--prompt",
            "> ",
            "--history",
            "/tmp/minish_history",
            "--stderr-diagnostics",
            "--log",
            "minish=debug",
        ]);
        assert_eq!(config.command.as_deref(), Some("echo hi"));
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.history, Some(PathBuf::from("/tmp/minish_history")));
        assert_eq!(config.diagnostics, DiagnosticStream::Stderr);
        assert_eq!(config.log_filter.as_deref(), Some("minish=debug"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::from_args(&["minish"], &["--bogus"]).is_err());
    }
}
