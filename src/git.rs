use std::{
    env, fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
    time::Duration,
};

use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

use crate::{account::Account, error::AppError, report::StepWarning};

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands, a seam so tests can script Git's behaviour
pub trait CommandRunner {
    /// Runs `program` with `args` in the current directory
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, AppError>;
}

/// Spawns real processes, killing any that outlive `timeout`
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, AppError> {
        let label = command_label(program, args);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| AppError::external_tool(&label, err))?;

        let stdout = child.stdout.take().map(|pipe| thread::spawn(move || drain(pipe)));
        let stderr = child.stderr.take().map(|pipe| thread::spawn(move || drain(pipe)));

        let status = match child
            .wait_timeout(self.timeout)
            .map_err(|err| AppError::external_tool(&label, err))?
        {
            Some(status) => status,
            None => {
                // The reader threads finish once the killed child closes its pipes.
                let _ = child.kill();
                let _ = child.wait();
                return Err(AppError::external_tool(
                    &label,
                    format!("timed out after {}s", self.timeout.as_secs()),
                ));
            }
        };

        let output = CommandOutput {
            success: status.success(),
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        };
        debug!(command = %label, code = ?status.code(), "command finished");
        Ok(output)
    }
}

fn drain(mut pipe: impl Read) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf);
    buf
}

fn join_reader(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default()
}

fn command_label(program: &str, args: &[&str]) -> String {
    // Keep values such as names and URLs out of step labels
    let shown = args.len().min(2);
    let mut label = program.to_string();
    for arg in &args[..shown] {
        label.push(' ');
        label.push_str(arg);
    }
    label
}

/// Changes the process working directory until dropped
#[derive(Debug)]
pub struct DirGuard {
    previous: PathBuf,
}

impl DirGuard {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        Ok(Self { previous })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.previous) {
            warn!(
                path = %self.previous.display(),
                error = %err,
                "failed to restore working directory"
            );
        }
    }
}

/// Options for the repository set up after scaffolding
#[derive(Debug, Clone)]
pub struct InitOptions<'a> {
    pub account: &'a Account,
    pub project_name: &'a str,
    pub commit_message: &'a str,
}

/// Initializes a Git repository in `dest_root` and creates the first commit
///
/// Every step runs even when an earlier one failed. Failures never abort the
/// caller; they are logged and returned as warnings.
pub fn initialize<R: CommandRunner>(
    runner: &R,
    dest_root: &Path,
    options: &InitOptions<'_>,
) -> Vec<StepWarning> {
    let mut warnings = Vec::new();

    let dest_root = match dest_root.canonicalize() {
        Ok(path) => path,
        Err(err) => {
            warnings.push(warn_step("git", err));
            return warnings;
        }
    };
    let _guard = match DirGuard::enter(&dest_root) {
        Ok(guard) => guard,
        Err(err) => {
            warnings.push(warn_step("git", err));
            return warnings;
        }
    };

    let account = options.account;
    let remote_url = account.remote_url(options.project_name);
    step(runner, &["init"], &mut warnings);
    step(runner, &["config", "user.name", &account.name], &mut warnings);
    step(runner, &["config", "user.email", &account.email], &mut warnings);
    step(runner, &["remote", "add", "origin", &remote_url], &mut warnings);

    let pending = step(runner, &["status", "--porcelain"], &mut warnings)
        .map(|status| !status.stdout.is_empty());
    // Only a successful, empty status gets a placeholder commit.
    if pending == Some(false) {
        let placeholder = dest_root.join("README.md");
        if !placeholder.exists() {
            let content = format!("# {}\n\nInitial project setup.", options.project_name);
            if let Err(err) = fs::write(&placeholder, content) {
                warnings.push(warn_step("placeholder", err));
            }
        }
    }

    step(runner, &["add", "."], &mut warnings);
    step(runner, &["commit", "-m", options.commit_message], &mut warnings);

    info!(
        path = %dest_root.display(),
        remote = %remote_url,
        warnings = warnings.len(),
        "git repository initialized"
    );
    warnings
}

/// Runs one git step, recording a warning instead of failing
fn step<R: CommandRunner>(
    runner: &R,
    args: &[&str],
    warnings: &mut Vec<StepWarning>,
) -> Option<CommandOutput> {
    match run_git(runner, args) {
        Ok(output) => Some(output),
        Err(warning) => {
            warnings.push(warning);
            None
        }
    }
}

fn run_git<R: CommandRunner>(runner: &R, args: &[&str]) -> Result<CommandOutput, StepWarning> {
    let label = command_label("git", args);
    let output = runner
        .run("git", args)
        .map_err(|err| match err {
            AppError::ExternalTool { step, reason } => warn_step(&step, reason),
            other => warn_step(&label, other),
        })?;

    if !output.success {
        let reason = if output.stderr.is_empty() {
            "exited with non-zero status".to_string()
        } else {
            output.stderr.clone()
        };
        return Err(warn_step(&label, reason));
    }
    Ok(output)
}

fn warn_step(step: &str, reason: impl ToString) -> StepWarning {
    let warning = StepWarning::new(step, reason.to_string());
    warn!(step = %warning.step, reason = %warning.message, "git step failed");
    warning
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use serial_test::serial;

    use super::*;

    /// Records calls and answers from a script keyed by the first argument
    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        pub calls: RefCell<Vec<Vec<String>>>,
        pub failing: Vec<&'static str>,
        pub status_output: String,
        pub cwd_seen: RefCell<Vec<PathBuf>>,
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, AppError> {
            assert_eq!(program, "git");
            self.calls
                .borrow_mut()
                .push(args.iter().map(|a| a.to_string()).collect());
            self.cwd_seen.borrow_mut().push(env::current_dir().unwrap());

            let sub = args.first().copied().unwrap_or_default();
            if self.failing.iter().any(|failing| *failing == sub) {
                return Err(AppError::external_tool(command_label(program, args), "boom"));
            }
            let stdout = if sub == "status" {
                self.status_output.clone()
            } else {
                String::new()
            };
            Ok(CommandOutput {
                success: true,
                stdout,
                stderr: String::new(),
            })
        }
    }

    fn alice() -> Account {
        Account::new("alice", "alice@example.com", "gh-alice", "~/.ssh/id_alice")
    }

    fn options(account: &Account) -> InitOptions<'_> {
        InitOptions {
            account,
            project_name: "demo",
            commit_message: "Initial commit",
        }
    }

    #[test]
    #[serial]
    fn runs_every_step_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner {
            status_output: "?? README.md".to_string(),
            ..Default::default()
        };
        let account = alice();

        let warnings = initialize(&runner, temp.path(), &options(&account));

        assert!(warnings.is_empty());
        let calls = runner.calls.borrow();
        let expected: Vec<Vec<&str>> = vec![
            vec!["init"],
            vec!["config", "user.name", "alice"],
            vec!["config", "user.email", "alice@example.com"],
            vec!["remote", "add", "origin", "git@gh-alice:alice/demo.git"],
            vec!["status", "--porcelain"],
            vec!["add", "."],
            vec!["commit", "-m", "Initial commit"],
        ];
        assert_eq!(*calls, expected);
        assert!(!temp.path().join("README.md").exists());
    }

    #[test]
    #[serial]
    fn commands_run_inside_project_and_cwd_is_restored() {
        let temp = tempfile::tempdir().expect("tempdir");
        let before = env::current_dir().unwrap();
        let runner = ScriptedRunner::default();
        let account = alice();

        initialize(&runner, temp.path(), &options(&account));

        let inside = temp.path().canonicalize().unwrap();
        assert!(runner.cwd_seen.borrow().iter().all(|dir| *dir == inside));
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn clean_tree_gets_placeholder_readme() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::default();
        let account = alice();

        initialize(&runner, temp.path(), &options(&account));

        assert_eq!(
            fs::read_to_string(temp.path().join("README.md")).unwrap(),
            "# demo\n\nInitial project setup."
        );
    }

    #[test]
    #[serial]
    fn failures_are_collected_and_later_steps_still_run() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("README.md"), "custom").unwrap();
        let runner = ScriptedRunner {
            failing: vec!["init", "remote", "status"],
            ..Default::default()
        };
        let account = alice();

        let warnings = initialize(&runner, temp.path(), &options(&account));

        let steps: Vec<&str> = warnings.iter().map(|w| w.step.as_str()).collect();
        assert_eq!(steps, vec!["git init", "git remote add", "git status --porcelain"]);
        assert_eq!(runner.calls.borrow().len(), 7);
        assert_eq!(fs::read_to_string(temp.path().join("README.md")).unwrap(), "custom");
    }

    struct PanickingRunner;

    impl CommandRunner for PanickingRunner {
        fn run(&self, _program: &str, _args: &[&str]) -> Result<CommandOutput, AppError> {
            panic!("runner exploded");
        }
    }

    #[test]
    #[serial]
    fn cwd_is_restored_when_runner_panics() {
        let temp = tempfile::tempdir().expect("tempdir");
        let before = env::current_dir().unwrap();
        let account = alice();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            initialize(&PanickingRunner, temp.path(), &options(&account))
        }));

        assert!(result.is_err());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn missing_directory_is_a_warning() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::default();
        let account = alice();

        let warnings = initialize(&runner, &temp.path().join("gone"), &options(&account));

        assert_eq!(warnings.len(), 1);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn missing_program_is_external_tool_error() {
        let runner = ProcessRunner::new(Duration::from_secs(5));
        let result = runner.run("kickoff-no-such-program", &["--version"]);
        assert!(matches!(result, Err(AppError::ExternalTool { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_times_out() {
        let runner = ProcessRunner::new(Duration::from_millis(200));
        let result = runner.run("sleep", &["5"]);
        match result {
            Err(AppError::ExternalTool { reason, .. }) => assert!(reason.contains("timed out")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn labels_hide_argument_values() {
        assert_eq!(command_label("git", &["config", "user.name", "alice"]), "git config user.name");
        assert_eq!(command_label("git", &["init"]), "git init");
    }
}
