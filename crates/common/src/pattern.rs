// Pattern compiler: text → calendar coordinates.
//
// Each character occupies GLYPH_WIDTH weeks followed by SPACING blank weeks.
// Coordinates are emitted character by character, then column by column, then
// row by row. The scheduler commits in exactly this order, so it decides which
// pixel receives which commit.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::glyph::{self, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Blank weeks between two characters.
pub const SPACING: usize = 1;
/// Width of the contribution calendar in weeks.
pub const MAX_WEEKS: usize = 53;
/// Height of the contribution calendar.
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("text is empty")]
    Empty,

    #[error(
        "text too long: max {max_chars} characters (needs {required_weeks} weeks, max {max_weeks})"
    )]
    TooLong { required_weeks: usize, max_weeks: usize, max_chars: usize },
}

/// One calendar cell that must receive commits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coordinate {
    /// Week offset from the start of the rendered text.
    pub week: usize,
    /// Day offset within the week (0-6).
    pub day: usize,
    /// Source character, uppercased.
    pub ch: char,
    /// Index of the source character in the normalized text.
    pub char_index: usize,
}

/// Summary of a compiled pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternStats {
    pub characters: usize,
    pub max_characters: usize,
    pub commits: usize,
    pub weeks: usize,
    pub max_weeks: usize,
    pub fits_in_graph: bool,
}

/// A `DAYS_PER_WEEK × weeks` grid of 0/1 cells, row-major by day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewGrid {
    cells: Vec<Vec<u8>>,
}

impl PreviewGrid {
    pub fn new(weeks: usize) -> Self {
        Self { cells: vec![vec![0; weeks]; DAYS_PER_WEEK] }
    }

    pub fn weeks(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.weeks() == 0
    }

    pub fn is_set(&self, day: usize, week: usize) -> bool {
        self.cells.get(day).and_then(|row| row.get(week)).is_some_and(|cell| *cell == 1)
    }

    /// Mark a cell; out-of-range coordinates are ignored.
    pub fn mark(&mut self, day: usize, week: usize) {
        if let Some(cell) = self.cells.get_mut(day).and_then(|row| row.get_mut(week)) {
            *cell = 1;
        }
    }

    /// Render one line per weekday using `on` and `off` for the cells.
    pub fn render(&self, on: char, off: char) -> String {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| if *cell == 1 { on } else { off }).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Normalize input text the way every pattern operation sees it: NFKC, then
/// uppercase.
pub fn normalize_text(text: &str) -> String {
    text.nfkc().flat_map(char::to_uppercase).collect()
}

/// Weeks occupied by `text`, including inter-character spacing.
pub fn required_weeks(text: &str) -> usize {
    weeks_for_len(normalize_text(text).chars().count())
}

/// How many characters fit in the calendar.
pub const fn max_characters() -> usize {
    (MAX_WEEKS + SPACING) / (GLYPH_WIDTH + SPACING)
}

/// Reject text that is blank or wider than the calendar.
pub fn validate(text: &str) -> Result<(), PatternError> {
    if text.trim().is_empty() {
        return Err(PatternError::Empty);
    }

    let required = required_weeks(text);
    if required > MAX_WEEKS {
        return Err(PatternError::TooLong {
            required_weeks: required,
            max_weeks: MAX_WEEKS,
            max_chars: max_characters(),
        });
    }

    Ok(())
}

/// Compile `text` into ordered coordinates.
///
/// Does not check capacity; callers run [`validate`] first.
pub fn compile(text: &str) -> Vec<Coordinate> {
    let normalized = normalize_text(text);
    let mut coordinates = Vec::new();

    for (char_index, ch) in normalized.chars().enumerate() {
        let glyph = glyph::lookup(ch);
        let origin = char_index * (GLYPH_WIDTH + SPACING);

        for col in 0..GLYPH_WIDTH {
            for row in 0..GLYPH_HEIGHT {
                if glyph.is_set(row, col) {
                    coordinates.push(Coordinate { week: origin + col, day: row, ch, char_index });
                }
            }
        }
    }

    coordinates
}

/// Build the preview grid for `text`.
pub fn preview_grid(text: &str) -> PreviewGrid {
    let mut grid = PreviewGrid::new(required_weeks(text));
    for coordinate in compile(text) {
        grid.mark(coordinate.day, coordinate.week);
    }
    grid
}

pub fn stats(text: &str) -> PatternStats {
    let characters = normalize_text(text).chars().count();
    let weeks = weeks_for_len(characters);

    PatternStats {
        characters,
        max_characters: max_characters(),
        commits: compile(text).len(),
        weeks,
        max_weeks: MAX_WEEKS,
        fits_in_graph: weeks <= MAX_WEEKS,
    }
}

fn weeks_for_len(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    len * (GLYPH_WIDTH + SPACING) - SPACING
}
