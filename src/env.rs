use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Mutable view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: variable overrides layered on top of the process environment. They win over
///   process variables on lookup and are passed to spawned commands.
/// - `current_dir`: the shell's working directory. It is the base for relative path checks
///   and the working directory of every spawned command. The process cwd is never changed.
/// - `should_exit`: set by the `exit` built-in; the read loop checks it after every line.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variable overrides (e.g. `PATH`, `HOME`).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process working directory into a new `Environment`.
    ///
    /// No variables are copied: lookups fall through to `std::env::var`, so the search path is
    /// read afresh on every call.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_current_dir(current_dir)
    }

    /// Create an environment rooted at `current_dir` with no overrides.
    pub fn with_current_dir(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.into(),
            should_exit: false,
        }
    }

    /// Get the value of a variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override a variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Directories of the `PATH` variable, in order. An unset variable yields no directories.
    pub fn search_path(&self) -> Vec<PathBuf> {
        match self.get_var("PATH") {
            Some(paths) => stdenv::split_paths(&paths).collect(),
            None => Vec::new(),
        }
    }

    /// The user's home directory as named by `HOME` (`USERPROFILE` on Windows).
    pub fn home_dir(&self) -> Option<PathBuf> {
        let home = self.get_var("HOME");
        #[cfg(windows)]
        let home = home.or_else(|| self.get_var("USERPROFILE"));
        home.filter(|h| !h.is_empty()).map(PathBuf::from)
    }

    /// Interpret `path` relative to the working directory. Absolute paths are returned as is.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
