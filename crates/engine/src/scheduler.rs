// Commit scheduler: coordinates → dated commits, in compile order.
//
// Each coordinate overwrites the state file, stages it, and commits
// `intensity` times with the same message and date. Progress is reported
// after every coordinate and cancellation is polled right after. Nothing is
// rolled back: commits created before a failure or cancellation stay in
// history.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, SubsecRound, TimeDelta};
use contribart_common::pattern::Coordinate;
use contribart_common::types::{
    render_message, CommitRequest, Identity, RepositoryState, ScheduleProgress,
    DEFAULT_MESSAGE_TEMPLATE,
};
use tracing::{debug, info, warn};

use crate::error::PaintError;
use crate::git::{CommandExecutor, GitWorker};
use crate::state::{self, STATE_FILE};

/// How far back the first calendar day lies.
pub const LOOKBACK_DAYS: i64 = 365;

/// Reference instant all target dates of one run are offset from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor(DateTime<FixedOffset>);

impl Anchor {
    /// `now - 365 days` in the local time zone, truncated to whole seconds.
    pub fn now() -> Self {
        Self::from_now(Local::now().fixed_offset())
    }

    pub fn from_now(now: DateTime<FixedOffset>) -> Self {
        Self(now.trunc_subsecs(0) - TimeDelta::days(LOOKBACK_DAYS))
    }

    /// Use `anchor` as-is.
    pub fn at(anchor: DateTime<FixedOffset>) -> Self {
        Self(anchor)
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// `anchor + week weeks + (day + 1) days`. Day 0 lands on the day after
    /// the anchor.
    pub fn target_date(&self, week: usize, day: usize) -> DateTime<FixedOffset> {
        self.0 + TimeDelta::weeks(week as i64) + TimeDelta::days(day as i64 + 1)
    }
}

/// Cooperative cancellation flag, shared between the caller and the run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Scheduler<'a, E> {
    worker: &'a GitWorker<E>,
    anchor: Anchor,
    intensity: u32,
    author: Option<Identity>,
    message_template: String,
}

impl<'a, E: CommandExecutor> Scheduler<'a, E> {
    pub fn new(worker: &'a GitWorker<E>, anchor: Anchor, intensity: u32) -> Self {
        Self {
            worker,
            anchor,
            intensity,
            author: None,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }

    pub fn with_author(mut self, author: Option<Identity>) -> Self {
        self.author = author;
        self
    }

    pub fn with_message_template(mut self, template: Option<String>) -> Self {
        if let Some(template) = template {
            self.message_template = template;
        }
        self
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn request_for(&self, coordinate: &Coordinate) -> CommitRequest {
        let date = self.anchor.target_date(coordinate.week, coordinate.day);
        CommitRequest {
            message: render_message(
                &self.message_template,
                coordinate.ch,
                coordinate.week,
                coordinate.day,
                &date,
            ),
            date,
            author: self.author.clone(),
            intensity: self.intensity,
        }
    }

    /// Commit every coordinate in order. Returns the number of commits made.
    pub fn run<F>(
        &self,
        coordinates: &[Coordinate],
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<usize, PaintError>
    where
        F: FnMut(&ScheduleProgress),
    {
        if self.intensity == 0 {
            return Err(PaintError::InvalidIntensity);
        }

        let total = coordinates.len();
        info!(
            total,
            intensity = self.intensity,
            anchor = %self.anchor.date().to_rfc3339(),
            "scheduling pattern commits"
        );

        let mut commits = 0;
        for (index, coordinate) in coordinates.iter().enumerate() {
            let request = self.request_for(coordinate);
            self.apply(coordinate, &request)?;
            commits += request.intensity as usize;

            let current = index + 1;
            on_progress(&ScheduleProgress {
                current,
                total,
                week: coordinate.week,
                day: coordinate.day,
                ch: coordinate.ch,
                percentage: ScheduleProgress::percentage_of(current, total),
            });

            if cancel.is_cancelled() {
                warn!(completed = current, total, "pattern run cancelled");
                return Err(PaintError::Cancelled { completed: current, total });
            }
        }

        info!(commits, "pattern commits created");
        Ok(commits)
    }

    fn apply(&self, coordinate: &Coordinate, request: &CommitRequest) -> Result<(), PaintError> {
        let commit_error = |message: String| PaintError::Commit {
            week: coordinate.week,
            day: coordinate.day,
            message,
        };

        let snapshot = RepositoryState {
            date: request.date.to_rfc3339(),
            week: coordinate.week,
            day: coordinate.day,
        };
        state::write_state(self.worker.repo_path(), &snapshot)
            .map_err(|error| commit_error(format!("failed to write {STATE_FILE}: {error}")))?;
        self.worker.add(&[STATE_FILE]).map_err(|error| commit_error(error.to_string()))?;

        for _ in 0..request.intensity {
            self.worker
                .commit_dated(&request.message, request.author.as_ref(), &request.date, &request.date)
                .map_err(|error| commit_error(error.to_string()))?;
        }

        debug!(
            week = coordinate.week,
            day = coordinate.day,
            ch = %coordinate.ch,
            date = %snapshot.date,
            "committed coordinate"
        );
        Ok(())
    }
}
