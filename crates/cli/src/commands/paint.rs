// `contribart paint`: create the dated commits and force-push them.
//
// The pipeline runs on a blocking worker; this task prints progress as it
// arrives and turns Ctrl-C into a cancellation request. A second Ctrl-C
// exits immediately.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use contribart_common::pattern;
use contribart_common::remote::validate_remote;
use contribart_common::types::{Identity, ScheduleProgress};
use contribart_engine::config::GlobalConfig;
use contribart_engine::{CancellationToken, PaintError, PaintReport, PaintRequest, Painter};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::commands::preview::format_stats_line;
use crate::exit_code::ExitCode;
use crate::output::{self, OutputFormat};

const MAX_INTENSITY: u32 = 10;

#[derive(Debug, Args)]
pub struct PaintArgs {
    /// Text to draw (up to 9 characters).
    #[arg(value_name = "TEXT")]
    text: String,

    /// Remote the pattern is force-pushed to.
    #[arg(long, value_name = "URL")]
    remote: String,

    /// Working repository (defaults to config `repo_dir`, then ~/github-contribution-repo).
    #[arg(long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Commits per pixel; higher values render darker.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_INTENSITY as i64))]
    intensity: Option<u32>,

    /// Author name for generated commits.
    #[arg(long, requires = "author_email")]
    author_name: Option<String>,

    /// Author email for generated commits.
    #[arg(long, requires = "author_name")]
    author_email: Option<String>,

    /// Commit message template (`{ch}`, `{week}`, `{day}`, `{date}`).
    #[arg(long)]
    message: Option<String>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ProgressLine<'a> {
    event: &'static str,
    #[serde(flatten)]
    progress: &'a ScheduleProgress,
}

pub fn run(args: PaintArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);

    let request = match build_request(args, &GlobalConfig::load()) {
        Ok(request) => request,
        Err(error) => {
            output::print_anyhow_error(format, &error);
            return Err(error);
        }
    };

    if format == OutputFormat::Human {
        print_header(&request);
    }

    let paint = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
        .and_then(|runtime| {
            let work = move |tx: mpsc::UnboundedSender<ScheduleProgress>, token: CancellationToken| {
                Painter::new().run(
                    &request,
                    |progress| {
                        let _ = tx.send(*progress);
                    },
                    &token,
                )
            };
            runtime.block_on(run_paint(work, |progress| print_progress(format, progress), format))
        });

    match paint {
        Ok(report) => {
            output::print_output(format, &report, format_human)?;
            Ok(())
        }
        Err(error) => {
            output::print_anyhow_error(format, &error);
            Err(error)
        }
    }
}

fn build_request(args: PaintArgs, config: &GlobalConfig) -> anyhow::Result<PaintRequest> {
    let text = args.text.trim().to_string();
    pattern::validate(&text)?;
    let remote_url = validate_remote(&args.remote).context("invalid --remote")?;

    let repo_dir = match args.dir.or_else(|| config.resolved_repo_dir()) {
        Some(dir) => dir,
        None => bail!("could not determine home directory; pass --dir"),
    };

    let author = match (args.author_name, args.author_email, &config.author) {
        (Some(name), Some(email), _) => Some(Identity::new(name, email)?),
        (_, _, Some(author)) => Some(author.identity().context("invalid [author] in config")?),
        _ => None,
    };

    let intensity = match args.intensity.or(config.intensity) {
        Some(value) if !(1..=MAX_INTENSITY).contains(&value) => {
            return Err(anyhow::Error::new(PaintError::InvalidIntensity)
                .context(format!("intensity {value} is outside 1..={MAX_INTENSITY}")));
        }
        Some(value) => value,
        None => 1,
    };

    Ok(PaintRequest {
        remote_url,
        repo_dir,
        text,
        intensity,
        author,
        message_template: args.message.or_else(|| config.message.clone()),
    })
}

/// Drive `work` on a blocking thread, feeding its progress to `sink`.
///
/// A failing sink cancels the run so nothing is published behind a dead
/// terminal.
async fn run_paint<W, S>(work: W, mut sink: S, format: OutputFormat) -> anyhow::Result<PaintReport>
where
    W: FnOnce(mpsc::UnboundedSender<ScheduleProgress>, CancellationToken) -> Result<PaintReport, PaintError>
        + Send
        + 'static,
    S: FnMut(&ScheduleProgress) -> io::Result<()>,
{
    let token = CancellationToken::new();
    let worker_token = token.clone();
    let (tx, mut rx) = mpsc::unbounded_channel::<ScheduleProgress>();

    let mut task = tokio::task::spawn_blocking(move || work(tx, worker_token));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut listening = true;
    let mut stop_requested = false;
    let mut sink_error: Option<io::Error> = None;

    let result = loop {
        tokio::select! {
            Some(progress) = rx.recv() => {
                if sink_error.is_none() {
                    if let Err(error) = sink(&progress) {
                        tracing::warn!(%error, "progress output failed; stopping run");
                        token.cancel();
                        sink_error = Some(error);
                    }
                }
            }
            joined = &mut task => break joined.context("paint worker panicked")?,
            signal = &mut ctrl_c, if listening => {
                if let Err(error) = signal {
                    tracing::warn!(%error, "failed to listen for Ctrl-C; run cannot be stopped");
                    listening = false;
                    continue;
                }
                match interrupt_action(stop_requested) {
                    Interrupt::ForceQuit => {
                        output::print_warning(format, "FORCE_QUIT", "second Ctrl-C; exiting without waiting for git");
                        std::process::exit(ExitCode::Cancelled.code());
                    }
                    Interrupt::Stop => {
                        stop_requested = true;
                        token.cancel();
                        output::print_warning(
                            format,
                            "STOP_REQUESTED",
                            "stopping after the current pixel; press Ctrl-C again to quit now",
                        );
                        ctrl_c.set(tokio::signal::ctrl_c());
                    }
                }
            }
        }
    };

    while let Ok(progress) = rx.try_recv() {
        if sink_error.is_none() {
            if let Err(error) = sink(&progress) {
                sink_error = Some(error);
            }
        }
    }

    match (result, sink_error) {
        (Ok(report), Some(error)) => {
            tracing::warn!(%error, branch = %report.branch, "pattern published but progress output failed");
            Ok(report)
        }
        (Ok(report), None) => Ok(report),
        (Err(error), Some(write_error)) => Err(anyhow::Error::new(error)
            .context(format!("progress output failed: {write_error}"))),
        (Err(error), None) => Err(annotate(error, format)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Finish the current pixel, then stop without publishing.
    Stop,
    /// Exit now, even if git is blocked.
    ForceQuit,
}

fn interrupt_action(stop_requested: bool) -> Interrupt {
    if stop_requested {
        Interrupt::ForceQuit
    } else {
        Interrupt::Stop
    }
}

fn annotate(error: PaintError, format: OutputFormat) -> anyhow::Error {
    let hint = match &error {
        PaintError::Cancelled { .. } | PaintError::Commit { .. } | PaintError::Publish { .. }
            if format == OutputFormat::Human =>
        {
            Some("commits already created remain in the local repository; re-running is safe")
        }
        _ => None,
    };
    match hint {
        Some(hint) => anyhow::Error::new(error).context(hint),
        None => anyhow::Error::new(error),
    }
}

fn print_progress(format: OutputFormat, progress: &ScheduleProgress) -> std::io::Result<()> {
    output::print_output(
        format,
        &ProgressLine { event: "progress", progress },
        |line| format_progress(line.progress),
    )
}

fn format_progress(progress: &ScheduleProgress) -> String {
    format!(
        "[{}/{}] '{}' at Week {}, Day {}",
        progress.current, progress.total, progress.ch, progress.week, progress.day
    )
}

fn print_header(request: &PaintRequest) {
    let stats = pattern::stats(&request.text);
    println!("Creating pattern: '{}'", pattern::normalize_text(&request.text));
    println!("Repository: {}", request.remote_url);
    println!("Working directory: {}", request.repo_dir.display());
    println!("Intensity: {} commits/pixel", request.intensity);
    println!("{}", format_stats_line(&stats));
    println!("Total commits: {}\n", stats.commits * request.intensity as usize);
}

fn format_human(report: &PaintReport) -> String {
    [
        String::new(),
        format!("Pattern '{}' created successfully!", report.text),
        format!("Repository location: {}", report.repo_path.display()),
        format!("Pushed {} commits to origin/{}", report.commits, report.branch),
        String::new(),
        "Don't forget to:".to_string(),
        "1. Enable 'Private contributions' in your profile settings if the remote is private"
            .to_string(),
        "2. Wait a few minutes for the contribution calendar to refresh".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use contribart_engine::config::AuthorConfig;
    use contribart_engine::Anchor;

    fn args(text: &str) -> PaintArgs {
        PaintArgs {
            text: text.to_string(),
            remote: "https://github.com/me/art.git".to_string(),
            dir: Some(PathBuf::from("/tmp/canvas")),
            intensity: None,
            author_name: None,
            author_email: None,
            message: None,
            json: false,
        }
    }

    #[test]
    fn build_request_applies_defaults() {
        let request = build_request(args("hi"), &GlobalConfig::default()).unwrap();
        assert_eq!(request.intensity, 1);
        assert_eq!(request.repo_dir, PathBuf::from("/tmp/canvas"));
        assert!(request.author.is_none());
        assert!(request.message_template.is_none());
    }

    #[test]
    fn flags_override_config() {
        let config = GlobalConfig {
            repo_dir: Some(PathBuf::from("/srv/art")),
            intensity: Some(5),
            message: Some("cfg {ch}".into()),
            author: Some(AuthorConfig { name: "Config".into(), email: "cfg@example.test".into() }),
        };
        let mut flags = args("A");
        flags.intensity = Some(2);
        flags.author_name = Some("Flag".into());
        flags.author_email = Some("flag@example.test".into());
        flags.message = Some("flag {ch}".into());

        let request = build_request(flags, &config).unwrap();
        assert_eq!(request.intensity, 2);
        assert_eq!(request.repo_dir, PathBuf::from("/tmp/canvas"));
        assert_eq!(request.author.unwrap().name, "Flag");
        assert_eq!(request.message_template.as_deref(), Some("flag {ch}"));
    }

    #[test]
    fn config_fills_missing_flags() {
        let config = GlobalConfig {
            repo_dir: Some(PathBuf::from("/srv/art")),
            intensity: Some(4),
            message: None,
            author: Some(AuthorConfig { name: "Config".into(), email: "cfg@example.test".into() }),
        };
        let mut flags = args("A");
        flags.dir = None;

        let request = build_request(flags, &config).unwrap();
        assert_eq!(request.repo_dir, PathBuf::from("/srv/art"));
        assert_eq!(request.intensity, 4);
        assert_eq!(request.author.unwrap().email, "cfg@example.test");
    }

    #[test]
    fn invalid_text_and_remote_are_rejected_up_front() {
        let error = build_request(args("   "), &GlobalConfig::default()).unwrap_err();
        assert_eq!(crate::output::error_code(&error), "PATTERN_EMPTY");

        let mut bad_remote = args("A");
        bad_remote.remote = "not a remote".into();
        let error = build_request(bad_remote, &GlobalConfig::default()).unwrap_err();
        assert_eq!(crate::output::error_code(&error), "INVALID_REMOTE");
    }

    #[test]
    fn progress_line_matches_log_format() {
        let progress = ScheduleProgress { current: 3, total: 32, week: 0, day: 2, ch: 'H', percentage: 9 };
        assert_eq!(format_progress(&progress), "[3/32] 'H' at Week 0, Day 2");
    }

    #[test]
    fn progress_json_is_tagged() {
        let progress = ScheduleProgress { current: 1, total: 2, week: 0, day: 0, ch: 'A', percentage: 50 };
        let value = serde_json::to_value(ProgressLine { event: "progress", progress: &progress }).unwrap();
        assert_eq!(value["event"], "progress");
        assert_eq!(value["percentage"], 50);
        assert_eq!(value["ch"], "A");
    }

    #[test]
    fn annotate_adds_rerun_hint_for_partial_runs() {
        let error = annotate(PaintError::Cancelled { completed: 1, total: 2 }, OutputFormat::Human);
        assert!(format!("{error:#}").contains("re-running is safe"));
        assert!(error.downcast_ref::<PaintError>().is_some());
    }

    #[test]
    fn text_is_trimmed_before_validation() {
        let request = build_request(args(" HI "), &GlobalConfig::default()).unwrap();
        assert_eq!(request.text, "HI");
        assert_eq!(pattern::compile(&request.text)[0].week, 0);

        let request = build_request(args("ABCDEFGHI "), &GlobalConfig::default()).unwrap();
        assert_eq!(request.text, "ABCDEFGHI");
    }

    #[test]
    fn out_of_range_config_intensity_is_rejected() {
        for value in [0, 11, 500] {
            let config = GlobalConfig { intensity: Some(value), ..GlobalConfig::default() };
            let error = build_request(args("A"), &config).unwrap_err();
            assert_eq!(crate::output::error_code(&error), "INVALID_INTENSITY");
            assert_eq!(ExitCode::from_error(&error), ExitCode::Usage);
        }

        let config = GlobalConfig { intensity: Some(MAX_INTENSITY), ..GlobalConfig::default() };
        assert_eq!(build_request(args("A"), &config).unwrap().intensity, MAX_INTENSITY);
    }

    fn progress(current: usize, total: usize) -> ScheduleProgress {
        ScheduleProgress { current, total, week: 0, day: current - 1, ch: 'A', percentage: 0 }
    }

    fn report(commits: usize) -> PaintReport {
        PaintReport {
            text: "A".into(),
            repo_path: PathBuf::from("/tmp/canvas"),
            repository_created: true,
            coordinates: commits,
            commits,
            branch: "main".into(),
            anchor: Anchor::now().date(),
        }
    }

    // Pauses after each event so the consumer can cancel before the next one.
    fn cancellable_work(
        total: usize,
        tx: mpsc::UnboundedSender<ScheduleProgress>,
        token: CancellationToken,
    ) -> Result<PaintReport, PaintError> {
        for current in 1..=total {
            let _ = tx.send(progress(current, total));
            for _ in 0..200 {
                if token.is_cancelled() {
                    return Err(PaintError::Cancelled { completed: current, total });
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        Ok(report(total))
    }

    #[tokio::test]
    async fn failing_progress_output_cancels_before_publish() {
        let writes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&writes);
        let sink = move |_: &ScheduleProgress| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        };

        let work = |tx, token| cancellable_work(7, tx, token);
        let error = run_paint(work, sink, OutputFormat::Json).await.unwrap_err();

        assert_eq!(
            error.downcast_ref::<PaintError>(),
            Some(&PaintError::Cancelled { completed: 1, total: 7 })
        );
        assert!(format!("{error:#}").contains("progress output failed"));
        assert_eq!(writes.load(Ordering::SeqCst), 1);
        assert_eq!(ExitCode::from_error(&error), ExitCode::Cancelled);
    }

    #[test]
    fn second_interrupt_forces_quit() {
        assert_eq!(interrupt_action(false), Interrupt::Stop);
        assert_eq!(interrupt_action(true), Interrupt::ForceQuit);
    }

    #[tokio::test]
    async fn progress_reaches_the_sink_in_order() {
        let mut seen = Vec::new();
        let report = run_paint(
            |tx: mpsc::UnboundedSender<ScheduleProgress>, _token: CancellationToken| {
                for current in 1..=3 {
                    let _ = tx.send(progress(current, 3));
                }
                Ok(report(3))
            },
            |progress: &ScheduleProgress| {
                seen.push(progress.current);
                Ok(())
            },
            OutputFormat::Json,
        )
        .await
        .unwrap();

        assert_eq!(report.commits, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
