// Git plumbing: a thin subprocess wrapper over the `git` executable.

#[cfg(test)]
pub(crate) mod mock;
pub mod worker;

pub use worker::{CommandExecutor, GitWorker, GitWorkerError, ProcessCommandExecutor};
