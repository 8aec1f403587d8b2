// Domain types shared between the engine and the CLI.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default commit message template. Placeholders: `{ch}`, `{week}`, `{day}`, `{date}`.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "Pattern: {ch} ({week},{day})";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("author name is empty")]
    EmptyName,

    #[error("author email is empty")]
    EmptyEmail,
}

/// Author/committer identity attached to generated commits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, IdentityError> {
        let name = name.into().trim().to_string();
        let email = email.into().trim().to_string();
        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }
        if email.is_empty() {
            return Err(IdentityError::EmptyEmail);
        }
        Ok(Self { name, email })
    }
}

/// Instruction to create `intensity` identical commits on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub date: DateTime<FixedOffset>,
    pub message: String,
    pub author: Option<Identity>,
    pub intensity: u32,
}

/// Progress event emitted after each coordinate's commits exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleProgress {
    pub current: usize,
    pub total: usize,
    pub week: usize,
    pub day: usize,
    pub ch: char,
    pub percentage: u8,
}

impl ScheduleProgress {
    /// Percentage of `current` over `total`, rounded half to even.
    pub fn percentage_of(current: usize, total: usize) -> u8 {
        if total == 0 {
            return 100;
        }
        let ratio = current as f64 / total as f64 * 100.0;
        ratio.round_ties_even().clamp(0.0, 100.0) as u8
    }
}

/// Contents of the tracked state file: the most recently applied coordinate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryState {
    /// Target date in RFC 3339.
    pub date: String,
    pub week: usize,
    pub day: usize,
}

/// Expand a commit message template for one coordinate.
pub fn render_message(
    template: &str,
    ch: char,
    week: usize,
    day: usize,
    date: &DateTime<FixedOffset>,
) -> String {
    template
        .replace("{ch}", &ch.to_string())
        .replace("{week}", &week.to_string())
        .replace("{day}", &day.to_string())
        .replace("{date}", &date.to_rfc3339())
}
