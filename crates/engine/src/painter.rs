// Paint pipeline: validate → ensure repository → schedule commits → publish.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use contribart_common::pattern::{self, normalize_text};
use contribart_common::types::{Identity, ScheduleProgress};
use serde::Serialize;
use tracing::info;

use crate::error::PaintError;
use crate::git::{CommandExecutor, ProcessCommandExecutor};
use crate::publisher::Repository;
use crate::scheduler::{Anchor, CancellationToken, Scheduler};

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintRequest {
    pub remote_url: String,
    pub repo_dir: PathBuf,
    pub text: String,
    pub intensity: u32,
    pub author: Option<Identity>,
    /// Overrides the default `Pattern: {ch} ({week},{day})` message.
    pub message_template: Option<String>,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaintReport {
    pub text: String,
    pub repo_path: PathBuf,
    pub repository_created: bool,
    pub coordinates: usize,
    pub commits: usize,
    pub branch: String,
    pub anchor: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct Painter<E = ProcessCommandExecutor> {
    executor: E,
    anchor: Option<Anchor>,
}

impl Painter<ProcessCommandExecutor> {
    pub fn new() -> Self {
        Self { executor: ProcessCommandExecutor, anchor: None }
    }
}

impl Default for Painter<ProcessCommandExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor + Clone> Painter<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor, anchor: None }
    }

    /// Pin the anchor instead of deriving it from the clock at run time.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Run the whole pipeline.
    ///
    /// Not atomic: a commit failure or cancellation leaves the commits made so
    /// far in the local repository and skips the push. Re-running is safe;
    /// the repository and its `origin` are reused.
    pub fn run<F>(
        &self,
        request: &PaintRequest,
        on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<PaintReport, PaintError>
    where
        F: FnMut(&ScheduleProgress),
    {
        pattern::validate(&request.text)?;
        if request.intensity == 0 {
            return Err(PaintError::InvalidIntensity);
        }

        let coordinates = pattern::compile(&request.text);
        if cancel.is_cancelled() {
            return Err(PaintError::Cancelled { completed: 0, total: coordinates.len() });
        }

        info!(
            text = %request.text,
            coordinates = coordinates.len(),
            intensity = request.intensity,
            repo = %request.repo_dir.display(),
            "painting pattern"
        );

        let repository =
            Repository::ensure(&request.remote_url, &request.repo_dir, self.executor.clone())?;
        let anchor = self.anchor.unwrap_or_else(Anchor::now);

        let commits = Scheduler::new(repository.worker(), anchor, request.intensity)
            .with_author(request.author.clone())
            .with_message_template(request.message_template.clone())
            .run(&coordinates, on_progress, cancel)?;

        let branch = repository.publish()?;

        Ok(PaintReport {
            text: normalize_text(&request.text),
            repo_path: repository.path().to_path_buf(),
            repository_created: repository.was_created(),
            coordinates: coordinates.len(),
            commits,
            branch,
            anchor: anchor.date(),
        })
    }
}
