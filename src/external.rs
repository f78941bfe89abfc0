use crate::command::{ExitCode, ProcessRunner, ShellCommand, Streams};
use crate::env::Environment;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, trace};

/// Resolve a command name the way the shell's `type`, `cd` and external dispatch expect.
///
/// Behavior:
/// - Empty name: returns `None`.
/// - A name that already names an existing entry (absolute, or relative to the working
///   directory of `env`) is returned unchanged. No search is performed.
/// - Otherwise each directory of `PATH`, in order, is joined with `name` and the first
///   existing match is returned.
///
/// Existence alone qualifies a match: no symlink resolution, no executable-bit check.
pub fn resolve(name: &str, env: &Environment) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let path = Path::new(name);
    if let Some(found) = find_by_path(env, path) {
        trace!(name, "resolved as an existing path");
        return Some(found.to_owned());
    }

    let found = find_in_path(env, path);
    trace!(name, found = ?found, "searched PATH");
    found
}

fn find_in_path(env: &Environment, cmd: &Path) -> Option<PathBuf> {
    for dir in env.search_path() {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(env, &path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path<'a>(env: &Environment, path: &'a Path) -> Option<&'a Path> {
    if env.absolute(path).exists() {
        Some(path)
    } else {
        None
    }
}

/// A command line that names an executable found by [`resolve`].
///
/// The full original line is handed to a [`ProcessRunner`]; the resolved path is only used
/// to decide that the line is runnable.
pub struct ExternalCommand<'r> {
    name: String,
    program: PathBuf,
    line: String,
    runner: &'r dyn ProcessRunner,
}

impl<'r> ExternalCommand<'r> {
    pub fn new(
        name: impl Into<String>,
        program: PathBuf,
        line: impl Into<String>,
        runner: &'r dyn ProcessRunner,
    ) -> Self {
        Self {
            name: name.into(),
            program,
            line: line.into(),
            runner,
        }
    }
}

impl ShellCommand for ExternalCommand<'_> {
    fn execute(
        self: Box<Self>,
        io: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        debug!(program = %self.program.display(), line = %self.line, "running external command");
        // The child writes straight to the inherited streams.
        io.stdout.flush()?;
        io.diagnostics.flush()?;

        match self.runner.run(&self.line, env) {
            Ok(code) => {
                if code != 0 {
                    debug!(code, line = %self.line, "external command failed");
                }
                Ok(code)
            }
            Err(e) => {
                writeln!(io.diagnostics, "{}: {:#}", self.name, e)?;
                Ok(127)
            }
        }
    }
}

/// Runs lines through the platform shell (`sh -c` on Unix, `cmd /C` on Windows) with
/// inherited standard streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, line: &str, env: &Environment) -> Result<ExitCode> {
        let mut child = platform_shell(line)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", line))?;
        let exit_status = child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", line))?;
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

#[cfg(unix)]
fn platform_shell(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

#[cfg(not(unix))]
fn platform_shell(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::fs::File;
    use std::rc::Rc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "external_tests_{}_{}_{}",
            tag,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn env_with_path(cwd: &Path, path: &str) -> Environment {
        let mut env = Environment::with_current_dir(cwd);
        env.set_var("PATH", path);
        env
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_is_returned_unchanged() {
        let env = env_with_path(Path::new("/"), "/does/not/matter");
        let res = resolve("/bin/sh", &env);
        assert_eq!(res, Some(PathBuf::from("/bin/sh")));
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let env = env_with_path(Path::new("/"), "/bin");
        let res = resolve("/bin/nonexisting_for_resolver_test", &env);
        assert!(res.is_none(), "Expected not to find a missing absolute path");
    }

    #[test]
    fn single_component_found_in_path() {
        let cwd = make_unique_temp_dir("cwd");
        let bin = make_unique_temp_dir("bin");
        File::create(bin.join("tool")).expect("touch tool");

        let env = env_with_path(&cwd, &bin.to_string_lossy());
        let found = resolve("tool", &env).expect("Expected to find 'tool' via PATH search");
        assert_eq!(found, bin.join("tool"));

        let _ = fs::remove_dir_all(cwd);
        let _ = fs::remove_dir_all(bin);
    }

    #[test]
    fn first_match_in_path_order_wins() {
        let cwd = make_unique_temp_dir("order_cwd");
        let first = make_unique_temp_dir("order_first");
        let second = make_unique_temp_dir("order_second");
        File::create(first.join("dup")).expect("touch first");
        File::create(second.join("dup")).expect("touch second");

        let joined = std::env::join_paths([&second, &first]).expect("join paths");
        let env = env_with_path(&cwd, &joined.to_string_lossy());
        assert_eq!(resolve("dup", &env), Some(second.join("dup")));

        let _ = fs::remove_dir_all(cwd);
        let _ = fs::remove_dir_all(first);
        let _ = fs::remove_dir_all(second);
    }

    #[test]
    fn single_component_not_found_in_path() {
        let cwd = make_unique_temp_dir("nf");
        let env = env_with_path(&cwd, &cwd.to_string_lossy());
        assert!(resolve("nonexisting", &env).is_none());
        let _ = fs::remove_dir_all(cwd);
    }

    #[test]
    fn relative_existing_uses_working_directory() {
        let cwd = make_unique_temp_dir("rel");
        fs::create_dir_all(cwd.join("bin")).expect("create bin dir");
        File::create(cwd.join("bin").join("sh")).expect("touch bin/sh");

        let env = env_with_path(&cwd, "");
        assert_eq!(resolve("bin/sh", &env), Some(PathBuf::from("bin/sh")));
        assert_eq!(resolve("./bin", &env), Some(PathBuf::from("./bin")));

        let _ = fs::remove_dir_all(cwd);
    }

    #[test]
    fn empty_name_is_none() {
        let env = Environment::new();
        assert!(resolve("", &env).is_none());
    }

    #[test]
    fn directories_qualify_as_matches() {
        let cwd = make_unique_temp_dir("dirs");
        let bin = make_unique_temp_dir("dirs_bin");
        fs::create_dir_all(bin.join("subdir")).expect("create subdir");

        let env = env_with_path(&cwd, &bin.to_string_lossy());
        assert_eq!(resolve("subdir", &env), Some(bin.join("subdir")));

        let _ = fs::remove_dir_all(cwd);
        let _ = fs::remove_dir_all(bin);
    }

    struct RecordingRunner {
        lines: Rc<RefCell<Vec<String>>>,
        result: Option<ExitCode>,
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&self, line: &str, _env: &Environment) -> Result<ExitCode> {
            self.lines.borrow_mut().push(line.to_string());
            self.result
                .ok_or_else(|| anyhow::anyhow!("No such file or directory"))
        }
    }

    #[test]
    fn external_command_hands_full_line_to_runner() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let runner = RecordingRunner {
            lines: lines.clone(),
            result: Some(3),
        };
        let mut env = Environment::new();
        let (mut out, mut diag) = (Vec::new(), Vec::new());
        let mut io = Streams::new(&mut out, &mut diag);

        let cmd = Box::new(ExternalCommand::new(
            "ls",
            PathBuf::from("/bin/ls"),
            "ls  -la 'a b'",
            &runner,
        ));
        let code = cmd.execute(&mut io, &mut env).unwrap();

        assert_eq!(code, 3);
        assert_eq!(*lines.borrow(), vec!["ls  -la 'a b'".to_string()]);
        assert!(diag.is_empty());
    }

    #[test]
    fn external_command_reports_spawn_failure() {
        let runner = RecordingRunner {
            lines: Rc::new(RefCell::new(Vec::new())),
            result: None,
        };
        let mut env = Environment::new();
        let (mut out, mut diag) = (Vec::new(), Vec::new());
        let mut io = Streams::new(&mut out, &mut diag);

        let cmd = Box::new(ExternalCommand::new(
            "tool",
            PathBuf::from("/opt/tool"),
            "tool",
            &runner,
        ));
        let code = cmd.execute(&mut io, &mut env).unwrap();

        assert_eq!(code, 127);
        assert_eq!(
            String::from_utf8(diag).unwrap(),
            "tool: No such file or directory\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn system_runner_reports_exit_status() {
        let env = Environment::new();
        assert_eq!(SystemRunner.run("exit 3", &env).unwrap(), 3);
        assert_eq!(SystemRunner.run("true", &env).unwrap(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn system_runner_uses_environment_state() {
        let cwd = make_unique_temp_dir("runner");
        File::create(cwd.join("marker")).expect("touch marker");

        let mut env = Environment::with_current_dir(&cwd);
        env.set_var("MINISH_RUNNER_TEST", "yes");
        let code = SystemRunner
            .run("test -f marker && test \"$MINISH_RUNNER_TEST\" = yes", &env)
            .unwrap();
        assert_eq!(code, 0);

        let _ = fs::remove_dir_all(cwd);
    }
}
