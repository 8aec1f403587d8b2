// Errors surfaced by a paint run.

use std::path::PathBuf;

use contribart_common::pattern::PatternError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaintError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("intensity must be at least 1")]
    InvalidIntensity,

    #[error("failed to prepare repository at `{}`: {message}", path.display())]
    RepositoryInit { path: PathBuf, message: String },

    #[error("failed to commit coordinate ({week},{day}): {message}")]
    Commit { week: usize, day: usize, message: String },

    #[error("cancelled after {completed} of {total} coordinates")]
    Cancelled { completed: usize, total: usize },

    #[error("failed to push `{branch}` to origin: {message}")]
    Publish { branch: String, message: String },
}

impl PaintError {
    /// Validation failures happen before any repository work.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Pattern(_) | Self::InvalidIntensity)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
