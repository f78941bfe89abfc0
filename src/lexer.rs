use crate::env::Environment;
use crate::external;
use tracing::trace;

/// Result of tokenizing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// First whitespace-delimited token of the original line, quotes untouched.
    pub name: String,
    /// Everything after the name with quote grouping resolved.
    pub argument_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Unquoted,
    Quoted(char),
}

/// Two-state scanner over the argument part of a line.
///
/// Quote characters that open or close a span are dropped; every other character, including
/// whitespace between spans, is kept as written. Inside a span the other quote kind is literal.
struct ArgumentScanner {
    state: ScanState,
    buffer: String,
}

impl ArgumentScanner {
    fn new() -> Self {
        ArgumentScanner {
            state: ScanState::Unquoted,
            buffer: String::new(),
        }
    }

    /// Returns `None` when the input ends inside a quoted span.
    fn scan(mut self, text: &str) -> Option<String> {
        for ch in text.chars() {
            match self.state {
                ScanState::Unquoted => self.handle_unquoted(ch),
                ScanState::Quoted(quote) => self.handle_quoted(ch, quote),
            }
        }

        match self.state {
            ScanState::Quoted(_) => None,
            ScanState::Unquoted => Some(self.buffer),
        }
    }

    fn handle_unquoted(&mut self, ch: char) {
        match ch {
            '\'' | '"' => self.state = ScanState::Quoted(ch),
            c => self.buffer.push(c),
        }
    }

    fn handle_quoted(&mut self, ch: char, quote: char) {
        if ch == quote {
            self.state = ScanState::Unquoted;
        } else {
            self.buffer.push(ch);
        }
    }
}

fn contains_quote(text: &str) -> bool {
    text.contains(['\'', '"'])
}

/// Resolve quote grouping in `text`.
///
/// Unterminated quoting is not an error: the text is returned unchanged.
pub fn group_quotes(text: &str) -> String {
    match ArgumentScanner::new().scan(text) {
        Some(grouped) => grouped,
        None => text.to_string(),
    }
}

/// Split `line` into a [`ParsedCommand`].
///
/// The name is always the first whitespace-delimited token of the original line. Without
/// quotes the remaining words are rejoined with single spaces. With quotes the remainder keeps
/// its spacing and only loses the quote characters, unless it names an existing path as
/// written, in which case it is kept unmodified.
pub fn tokenize(line: &str, env: &Environment) -> ParsedCommand {
    let line = line.trim_start();
    let name = line.split_whitespace().next().unwrap_or_default();
    let rest = line[name.len()..].trim_start();

    let argument_text = if !contains_quote(rest) {
        rest.split_whitespace().collect::<Vec<_>>().join(" ")
    } else if external::resolve(rest, env).is_some() {
        trace!(rest, "quoted argument names an existing path, keeping it literal");
        rest.to_string()
    } else {
        group_quotes(rest)
    };

    ParsedCommand {
        name: name.to_string(),
        argument_text,
    }
}
