// CLI subcommand dispatch.

use clap::Subcommand;

pub mod paint;
pub mod preview;

#[derive(Subcommand)]
pub enum Command {
    /// Show how text will render on the calendar
    Preview(preview::PreviewArgs),
    /// Create the dated commits and force-push them
    Paint(paint::PaintArgs),
}

pub fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Preview(args) => preview::run(args),
        Command::Paint(args) => paint::run(args),
    }
}
