// `contribart preview`: render text onto the calendar grid without touching git.

use std::collections::HashSet;

use clap::Args;
use contribart_common::glyph;
use contribart_common::pattern::{self, PatternStats, PreviewGrid};
use serde::Serialize;

use crate::output::{self, OutputFormat};

const CELL_ON: char = '█';
const CELL_OFF: char = '·';

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Text to draw (up to 9 characters).
    #[arg(value_name = "TEXT")]
    text: String,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewResult {
    pub text: String,
    pub stats: PatternStats,
    pub grid: PreviewGrid,
    /// Characters drawn with the fallback box.
    pub unsupported: Vec<char>,
}

pub fn run(args: PreviewArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);

    let text = args.text.trim();
    if let Err(error) = pattern::validate(text) {
        let error = anyhow::Error::new(error);
        output::print_anyhow_error(format, &error);
        return Err(error);
    }

    let result = build_preview(text);
    if !result.unsupported.is_empty() {
        let list: String = result.unsupported.iter().collect();
        output::print_warning(
            format,
            "UNSUPPORTED_CHARACTERS",
            &format!("no glyph for {list:?}; these characters render as a box"),
        );
    }

    output::print_output(format, &result, format_human)?;
    Ok(())
}

pub fn build_preview(text: &str) -> PreviewResult {
    let normalized = pattern::normalize_text(text);
    let mut seen = HashSet::new();
    let unsupported: Vec<char> = normalized
        .chars()
        .filter(|ch| !glyph::is_supported(*ch) && seen.insert(*ch))
        .collect();

    PreviewResult {
        stats: pattern::stats(text),
        grid: pattern::preview_grid(text),
        text: normalized,
        unsupported,
    }
}

pub fn format_stats_line(stats: &PatternStats) -> String {
    format!(
        "{} chars | {} commits | {} weeks (max {} chars, {} weeks)",
        stats.characters, stats.commits, stats.weeks, stats.max_characters, stats.max_weeks
    )
}

fn format_human(result: &PreviewResult) -> String {
    format!("{}\n\n{}", format_stats_line(&result.stats), result.grid.render(CELL_ON, CELL_OFF))
}
