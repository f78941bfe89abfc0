use anyhow::Result;
use minish::Interpreter;
use minish::config::{Args, Config, DiagnosticStream};
use minish::env::Environment;
use minish::io_adapters::{EditorReader, LineReader, ScriptedReader};
use std::io::Write;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(filter: Option<&str>) {
    // `--log` wins over RUST_LOG; quiet by default so diagnostics stay readable.
    let filter = match filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let config: Config = argh::from_env::<Args>().into();
    init_tracing(config.log_filter.as_deref());

    let mut sh = Interpreter::new(Environment::new())?;
    let mut reader: Box<dyn LineReader> = match &config.command {
        Some(line) => Box::new(ScriptedReader::new([line.as_str()])),
        None => Box::new(EditorReader::new(config.history.clone())?),
    };

    let mut stdout = std::io::stdout();
    let mut diag_stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let diagnostics: &mut dyn Write = match config.diagnostics {
        DiagnosticStream::Stdout => &mut diag_stdout,
        DiagnosticStream::Stderr => &mut stderr,
    };

    let code = sh.repl(reader.as_mut(), &config.prompt, &mut stdout, diagnostics)?;
    std::process::exit(code)
}
