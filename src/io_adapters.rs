use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::{debug, warn};

/// What one attempt to read a line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line of input, without the trailing newline.
    Line(String),
    /// The user interrupted the current line (Ctrl-C).
    Interrupted,
    /// No more input.
    Eof,
}

/// Source of input lines for the read loop.
pub trait LineReader {
    /// Show `prompt` (if the source is interactive) and read one line.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    /// Called once when the loop ends.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Terminal input through rustyline, with optional persistent history.
pub struct EditorReader {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl EditorReader {
    /// Create an editor. An existing history file is loaded; a missing one is not an error.
    pub fn new(history: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;
        if let Some(path) = &history {
            if let Err(e) = editor.load_history(path) {
                debug!(path = %path.display(), "no history loaded: {}", e);
            }
        }
        Ok(Self { editor, history })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .context("failed to record history")?;
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err).context("failed to read line"),
        }
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(path) = &self.history {
            // Losing history should not turn a clean exit into a failure.
            if let Err(e) = self.editor.save_history(path) {
                warn!(path = %path.display(), "failed to save history: {}", e);
            }
        }
        Ok(())
    }
}

/// Memory-backed line source: used for `-c` and in tests.
#[derive(Debug, Default, Clone)]
pub struct ScriptedReader {
    lines: VecDeque<String>,
}

impl ScriptedReader {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Lines not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
        Ok(match self.lines.pop_front() {
            Some(line) => ReadOutcome::Line(line),
            None => ReadOutcome::Eof,
        })
    }
}
