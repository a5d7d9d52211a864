//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use clap::Parser;
use miette::{GraphicalReportHandler, GraphicalTheme};
use std::io;
use std::process::ExitCode;
use taskweave::{cli::Cli, manifest::ManifestError, runner};
use tracing::Level;
use tracing_subscriber::fmt;

/// Render manifest diagnostics with their source snippet and hints.
fn render_manifest_diagnostic(err: &anyhow::Error) -> Option<String> {
    let diagnostic = err.downcast_ref::<ManifestError>()?;
    let mut rendered = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .render_report(&mut rendered, diagnostic)
        .ok()?;
    Some(rendered)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            if let Some(report) = render_manifest_diagnostic(&err) {
                tracing::error!("\n{report}");
            }
            ExitCode::FAILURE
        }
    }
}
