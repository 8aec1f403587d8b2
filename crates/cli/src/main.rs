// contribart CLI entry point.

use clap::Parser;

mod commands;
mod exit_code;
mod output;

#[derive(Parser)]
#[command(name = "contribart", about = "Draw text on your contribution calendar")]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli.command) {
        Ok(()) => exit_code::ExitCode::Success.into(),
        Err(error) => {
            tracing::debug!(error = %format!("{error:#}"), "command failed");
            exit_code::ExitCode::from_error(&error).into()
        }
    }
}
