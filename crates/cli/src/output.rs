// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` flag forces JSON output regardless of terminal.

use contribart_common::pattern::PatternError;
use contribart_common::remote::RemoteError;
use contribart_engine::PaintError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per line).
    Json,
}

impl OutputFormat {
    /// Auto-detect format: JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    /// Testable variant that takes an explicit `is_tty` flag.
    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

/// Write a value to a provided writer (useful for testing).
pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => {
            writeln!(writer, "{}", human_fn(value))
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    print_diagnostic(format, "error", code, message, ANSI_RED);
}

/// Write a warning to stderr in the selected format.
pub fn print_warning(format: OutputFormat, code: &str, message: &str) {
    print_diagnostic(format, "warning", code, message, ANSI_YELLOW);
}

/// Print a command failure with a stable error code.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    print_error(format, error_code(error), &format!("{error:#}"));
}

fn print_diagnostic(format: OutputFormat, label: &str, code: &str, message: &str, color: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line = render_human_stderr_line(label, message, io::stderr().is_terminal(), color);
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let mut obj = serde_json::Map::new();
            obj.insert(
                label.to_string(),
                serde_json::json!({
                    "code": code,
                    "message": message,
                }),
            );
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Stable machine-readable code for an error chain.
pub fn error_code(error: &anyhow::Error) -> &'static str {
    for cause in error.chain() {
        if let Some(paint) = cause.downcast_ref::<PaintError>() {
            return match paint {
                PaintError::Pattern(pattern) => pattern_error_code(pattern),
                PaintError::InvalidIntensity => "INVALID_INTENSITY",
                PaintError::RepositoryInit { .. } => "REPOSITORY_INIT_FAILED",
                PaintError::Commit { .. } => "COMMIT_FAILED",
                PaintError::Cancelled { .. } => "CANCELLED",
                PaintError::Publish { .. } => "PUBLISH_FAILED",
            };
        }
        if let Some(pattern) = cause.downcast_ref::<PatternError>() {
            return pattern_error_code(pattern);
        }
        if cause.downcast_ref::<RemoteError>().is_some() {
            return "INVALID_REMOTE";
        }
    }
    "ERROR"
}

fn pattern_error_code(error: &PatternError) -> &'static str {
    match error {
        PatternError::Empty => "PATTERN_EMPTY",
        PatternError::TooLong { .. } => "PATTERN_TOO_LONG",
    }
}

fn render_human_stderr_line(label: &str, message: &str, is_tty: bool, color: &str) -> String {
    if is_tty {
        format!("{color}{label}:{ANSI_RESET} {message}")
    } else {
        format!("{label}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_tty_returns_human() {
        assert_eq!(OutputFormat::detect_from_terminal(true), OutputFormat::Human);
    }

    #[test]
    fn detect_pipe_returns_json() {
        assert_eq!(OutputFormat::detect_from_terminal(false), OutputFormat::Json);
    }

    #[test]
    fn detect_json_flag_overrides_tty() {
        assert_eq!(OutputFormat::detect(true), OutputFormat::Json);
    }

    #[test]
    fn write_output_human_format() {
        #[derive(Serialize)]
        struct Info {
            text: String,
        }
        let info = Info { text: "HI".into() };
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Human, &info, |i| format!("Text: {}", i.text))
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Text: HI\n");
    }

    #[test]
    fn write_output_json_format() {
        #[derive(Serialize)]
        struct Info {
            text: String,
            commits: u32,
        }
        let info = Info { text: "HI".into(), commits: 32 };
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Json, &info, |_| {
            unreachable!("human_fn should not be called in JSON mode")
        })
        .unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["text"], "HI");
        assert_eq!(parsed["commits"], 32);
    }

    #[test]
    fn print_error_does_not_panic_in_either_format() {
        print_error(OutputFormat::Human, "TEST_ERR", "something broke");
        print_error(OutputFormat::Json, "TEST_ERR", "something broke");
        print_warning(OutputFormat::Json, "WARN", "heads up");
    }

    #[test]
    fn render_human_error_uses_color_for_tty() {
        let line = render_human_stderr_line("error", "boom", true, ANSI_RED);
        assert!(line.contains(ANSI_RED));
        assert!(line.contains(ANSI_RESET));
        assert!(line.contains("boom"));
    }

    #[test]
    fn render_human_warning_without_tty_is_plain() {
        let line = render_human_stderr_line("warning", "careful", false, ANSI_YELLOW);
        assert_eq!(line, "warning: careful");
    }

    #[test]
    fn error_code_maps_paint_errors() {
        let cancelled = anyhow::Error::new(PaintError::Cancelled { completed: 3, total: 10 });
        assert_eq!(error_code(&cancelled), "CANCELLED");

        let publish = anyhow::Error::new(PaintError::Publish {
            branch: "main".into(),
            message: "fatal: Authentication failed".into(),
        });
        assert_eq!(error_code(&publish), "PUBLISH_FAILED");

        let too_long = anyhow::Error::new(PaintError::Pattern(PatternError::TooLong {
            required_weeks: 59,
            max_weeks: 53,
            max_chars: 9,
        }));
        assert_eq!(error_code(&too_long), "PATTERN_TOO_LONG");
    }

    #[test]
    fn error_code_finds_typed_errors_behind_context() {
        let error = anyhow::Error::new(PatternError::Empty).context("preview failed");
        assert_eq!(error_code(&error), "PATTERN_EMPTY");

        let remote = anyhow::Error::new(RemoteError::Empty).context("invalid --remote");
        assert_eq!(error_code(&remote), "INVALID_REMOTE");

        assert_eq!(error_code(&anyhow::anyhow!("boom")), "ERROR");
    }
}
