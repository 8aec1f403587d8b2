use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, FixedOffset};
use contribart_common::types::Identity;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitWorkerError {
    EmptyAddPaths,
    SpawnFailed { command: String, message: String },
    CommandFailed { command: String, code: Option<i32>, stderr: String },
}

impl Display for GitWorkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GitWorkerError::EmptyAddPaths => write!(f, "git add requires at least one path"),
            GitWorkerError::SpawnFailed { command, message } => {
                write!(f, "failed to run `{command}`: {message}")
            }
            GitWorkerError::CommandFailed { command, code, stderr } => {
                write!(f, "`{command}` failed with code {:?}: {}", code, stderr.trim())
            }
        }
    }
}

impl Error for GitWorkerError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        envs: &[(String, String)],
    ) -> Result<CommandResult, std::io::Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        envs: &[(String, String)],
    ) -> Result<CommandResult, std::io::Error> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(envs.iter().map(|(key, value)| (key.as_str(), value.as_str())))
            .output()?;
        Ok(CommandResult {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Format a timestamp the way git stores it internally: `@<unix> <+hhmm>`.
pub fn git_date(date: &DateTime<FixedOffset>) -> String {
    format!("@{} {}", date.timestamp(), date.format("%z"))
}

#[derive(Debug, Clone)]
pub struct GitWorker<E = ProcessCommandExecutor> {
    repo_path: PathBuf,
    executor: E,
}

impl GitWorker<ProcessCommandExecutor> {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self { repo_path: repo_path.into(), executor: ProcessCommandExecutor }
    }
}

impl<E: CommandExecutor> GitWorker<E> {
    pub fn with_executor(repo_path: impl Into<PathBuf>, executor: E) -> Self {
        Self { repo_path: repo_path.into(), executor }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Whether the working directory already holds a `.git` directory.
    pub fn has_git_dir(&self) -> bool {
        self.repo_path.join(".git").exists()
    }

    pub fn init(&self) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["init".to_string()])
    }

    pub fn remotes(&self) -> Result<Vec<String>, GitWorkerError> {
        let output = self.run(vec!["remote".to_string()])?;
        Ok(non_empty_lines(&output.stdout))
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["remote".to_string(), "add".to_string(), name.to_string(), url.to_string()])
    }

    pub fn remove_remote(&self, name: &str) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["remote".to_string(), "remove".to_string(), name.to_string()])
    }

    pub fn add<S: AsRef<str>>(&self, paths: &[S]) -> Result<GitCommandOutput, GitWorkerError> {
        if paths.is_empty() {
            return Err(GitWorkerError::EmptyAddPaths);
        }

        let mut args = vec!["add".to_string()];
        args.extend(paths.iter().map(|path| path.as_ref().to_string()));
        self.run(args)
    }

    /// Create a commit with explicit author and committer dates.
    ///
    /// Always passes `--allow-empty`: repeated commits over the same staged
    /// content must each produce a new commit object. Without an identity,
    /// git falls back to its configured `user.name`/`user.email`.
    pub fn commit_dated(
        &self,
        message: &str,
        identity: Option<&Identity>,
        author_date: &DateTime<FixedOffset>,
        commit_date: &DateTime<FixedOffset>,
    ) -> Result<GitCommandOutput, GitWorkerError> {
        let mut envs = vec![
            ("GIT_AUTHOR_DATE".to_string(), git_date(author_date)),
            ("GIT_COMMITTER_DATE".to_string(), git_date(commit_date)),
        ];
        if let Some(identity) = identity {
            envs.push(("GIT_AUTHOR_NAME".to_string(), identity.name.clone()));
            envs.push(("GIT_AUTHOR_EMAIL".to_string(), identity.email.clone()));
            envs.push(("GIT_COMMITTER_NAME".to_string(), identity.name.clone()));
            envs.push(("GIT_COMMITTER_EMAIL".to_string(), identity.email.clone()));
        }

        self.run_with_env(
            vec![
                "commit".to_string(),
                "--allow-empty".to_string(),
                "-m".to_string(),
                message.to_string(),
            ],
            &envs,
        )
    }

    /// Local branch names.
    pub fn branches(&self) -> Result<Vec<String>, GitWorkerError> {
        let output = self.run(vec![
            "for-each-ref".to_string(),
            "--format=%(refname:short)".to_string(),
            "refs/heads/".to_string(),
        ])?;
        Ok(non_empty_lines(&output.stdout))
    }

    pub fn is_detached_head(&self) -> Result<bool, GitWorkerError> {
        let args = vec!["symbolic-ref".to_string(), "-q".to_string(), "HEAD".to_string()];
        let (command, result) = self.execute(&args, &[])?;

        match (result.success, result.code) {
            (true, _) => Ok(false),
            // `symbolic-ref -q` exits 1 when HEAD is not a symbolic ref.
            (false, Some(1)) => Ok(true),
            (false, code) => Err(GitWorkerError::CommandFailed {
                command,
                code,
                stderr: failure_text(result.stdout, result.stderr),
            }),
        }
    }

    pub fn current_branch(&self) -> Result<String, GitWorkerError> {
        let output = self.run(vec![
            "symbolic-ref".to_string(),
            "--short".to_string(),
            "HEAD".to_string(),
        ])?;
        Ok(output.stdout.trim().to_string())
    }

    pub fn checkout(&self, branch: &str) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["checkout".to_string(), branch.to_string()])
    }

    pub fn checkout_new_branch(&self, branch: &str) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["checkout".to_string(), "-b".to_string(), branch.to_string()])
    }

    /// Force-push `branch` to the same branch name on `remote`.
    pub fn push_force(
        &self,
        remote: &str,
        branch: &str,
    ) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec![
            "push".to_string(),
            "--force".to_string(),
            remote.to_string(),
            format!("{branch}:{branch}"),
        ])
    }

    pub fn commit_count(&self) -> Result<usize, GitWorkerError> {
        let output =
            self.run(vec!["rev-list".to_string(), "--count".to_string(), "HEAD".to_string()])?;
        output.stdout.trim().parse().map_err(|_| GitWorkerError::CommandFailed {
            command: "git rev-list --count HEAD".to_string(),
            code: Some(0),
            stderr: format!("unexpected output: {}", output.stdout.trim()),
        })
    }

    fn run(&self, args: Vec<String>) -> Result<GitCommandOutput, GitWorkerError> {
        self.run_with_env(args, &[])
    }

    fn run_with_env(
        &self,
        args: Vec<String>,
        envs: &[(String, String)],
    ) -> Result<GitCommandOutput, GitWorkerError> {
        let (command, result) = self.execute(&args, envs)?;

        if result.success {
            return Ok(GitCommandOutput { stdout: result.stdout, stderr: result.stderr });
        }

        Err(GitWorkerError::CommandFailed {
            command,
            code: result.code,
            stderr: failure_text(result.stdout, result.stderr),
        })
    }

    fn execute(
        &self,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<(String, CommandResult), GitWorkerError> {
        let command = format!("git {}", args.join(" "));
        debug!(repo = %self.repo_path.display(), %command, "running git");
        let result = self.executor.execute("git", args, &self.repo_path, envs).map_err(|error| {
            GitWorkerError::SpawnFailed { command: command.clone(), message: error.to_string() }
        })?;
        Ok((command, result))
    }
}

fn failure_text(stdout: String, stderr: String) -> String {
    if stderr.trim().is_empty() {
        stdout
    } else {
        stderr
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string).collect()
}
