// Repository setup and forced publish.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::PaintError;
use crate::git::{CommandExecutor, GitWorker, GitWorkerError};
use crate::state;

pub const REMOTE_NAME: &str = "origin";
/// Branch used when the repository has no branch yet or HEAD is detached.
pub const DEFAULT_BRANCH: &str = "main";

/// A working repository whose `origin` points at the paint target.
#[derive(Debug)]
pub struct Repository<E> {
    worker: GitWorker<E>,
    created: bool,
}

impl<E: CommandExecutor> Repository<E> {
    /// Reuse the repository at `path` or create one, then point `origin` at
    /// `remote_url`.
    ///
    /// An existing `origin` is deleted and recreated, so running this twice
    /// leaves exactly one `origin` with the latest URL.
    pub fn ensure(
        remote_url: &str,
        path: impl Into<PathBuf>,
        executor: E,
    ) -> Result<Self, PaintError> {
        let path = path.into();
        let init_error = |message: String| PaintError::RepositoryInit {
            path: path.clone(),
            message,
        };

        std::fs::create_dir_all(&path)
            .map_err(|error| init_error(format!("failed to create directory: {error}")))?;

        let worker = GitWorker::with_executor(path.clone(), executor);
        let git_error = |error: GitWorkerError| init_error(error.to_string());

        if worker.has_git_dir() {
            if worker.remotes().map_err(git_error)?.iter().any(|name| name == REMOTE_NAME) {
                worker.remove_remote(REMOTE_NAME).map_err(git_error)?;
            }
            worker.add_remote(REMOTE_NAME, remote_url).map_err(git_error)?;
            info!(path = %path.display(), "reusing existing repository");
            return Ok(Self { worker, created: false });
        }

        worker.init().map_err(git_error)?;
        worker.add_remote(REMOTE_NAME, remote_url).map_err(git_error)?;
        state::initialize_state(&path).map_err(|error| {
            init_error(format!("failed to write {}: {error}", state::STATE_FILE))
        })?;
        info!(path = %path.display(), "initialized repository");

        Ok(Self { worker, created: true })
    }

    pub fn worker(&self) -> &GitWorker<E> {
        &self.worker
    }

    pub fn path(&self) -> &Path {
        self.worker.repo_path()
    }

    /// Whether `ensure` had to create the repository.
    pub fn was_created(&self) -> bool {
        self.created
    }

    /// Force-push the current branch to `origin`, returning the branch name.
    ///
    /// Falls back to `main` when there is no branch yet or HEAD is detached.
    /// The remote branch is overwritten unconditionally.
    pub fn publish(&self) -> Result<String, PaintError> {
        let branch = self.select_branch().map_err(|error| PaintError::Publish {
            branch: DEFAULT_BRANCH.to_string(),
            message: error.to_string(),
        })?;

        self.worker.push_force(REMOTE_NAME, &branch).map_err(|error| PaintError::Publish {
            branch: branch.clone(),
            message: error.to_string(),
        })?;

        info!(%branch, remote = REMOTE_NAME, "force-pushed pattern");
        Ok(branch)
    }

    fn select_branch(&self) -> Result<String, GitWorkerError> {
        let branches = self.worker.branches()?;

        if branches.is_empty() {
            self.worker.checkout_new_branch(DEFAULT_BRANCH)?;
            return Ok(DEFAULT_BRANCH.to_string());
        }

        if self.worker.is_detached_head()? {
            if branches.iter().any(|name| name == DEFAULT_BRANCH) {
                self.worker.checkout(DEFAULT_BRANCH)?;
            } else {
                self.worker.checkout_new_branch(DEFAULT_BRANCH)?;
            }
            return Ok(DEFAULT_BRANCH.to_string());
        }

        self.worker.current_branch()
    }
}
