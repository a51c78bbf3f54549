//! Main CLI application structure

use std::fmt;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{calendar, compact, dependency, logging, project, requirement, task};
use crate::domain::{DateRange, Rejection};
use crate::storage::{Cascade, Config, Workspace};

#[derive(Parser)]
#[command(name = "workplan")]
#[command(author, version, about = "Team task scheduling with workday-aware consistency checks")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workplan workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage projects
    #[command(subcommand)]
    Project(project::ProjectCommands),

    /// Manage requirements
    #[command(subcommand, alias = "requirement")]
    Req(requirement::RequirementCommands),

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Manage task dependencies
    #[command(subcommand)]
    Dep(dependency::DependencyCommands),

    /// Show all tasks in dependency order
    Order,

    /// Query the working calendar
    #[command(subcommand)]
    Calendar(calendar::CalendarCommands),

    /// Rewrite the record files, dropping superseded lines
    Compact,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let format = cli.format.unwrap_or_else(|| match Config::load_global() {
        Ok(global) => global.default_format.into(),
        Err(err) => {
            tracing::warn!("ignoring global config: {:#}", err);
            OutputFormat::Text
        }
    });
    let output = Output::new(format);

    let result = dispatch(cli.command, &output);

    if let Err(err) = &result {
        if let Some(rejection) = err.downcast_ref::<Rejection>() {
            tracing::debug!(kind = rejection.kind(), "write rejected");
            output.rejection(rejection);
        }
    }

    result
}

fn dispatch(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init { path } => {
            tracing::debug!(%path, "initializing workspace");
            let workspace = Workspace::init(&path)?;
            output.success(&format!(
                "Initialized workplan workspace at {}",
                workspace.root().display()
            ));
            Ok(())
        }
        Commands::Project(cmd) => project::run(cmd, output),
        Commands::Req(cmd) => requirement::run(cmd, output),
        Commands::Task(cmd) => task::run(cmd, output),
        Commands::Dep(cmd) => dependency::run(cmd, output),
        Commands::Order => dependency::order(output),
        Commands::Calendar(cmd) => calendar::run(cmd, output),
        Commands::Compact => compact::run(output),
    }
}

/// Builds an optional date range from `--start`/`--end` flags
pub(super) fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Option<DateRange>> {
    match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end)
            .map(Some)
            .context("Invalid date range"),
        (None, None) => Ok(None),
        _ => anyhow::bail!("--start and --end must be given together"),
    }
}

/// Formats an optional date range for list output
pub(super) fn range_text(range: Option<&DateRange>) -> String {
    range.map_or_else(|| "-".to_string(), |r| r.to_string())
}

/// Reports a removal along with everything deleted under it
pub(super) fn report_removal(output: &Output, what: &str, id: &dyn fmt::Display, cascade: &Cascade) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "removed": id.to_string(),
            "cascade": cascade,
        }));
        return;
    }

    let counts: Vec<String> = [
        (cascade.requirements.len(), "requirement"),
        (cascade.tasks.len(), "task"),
        (cascade.dependencies.len(), "dependency"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, noun)| match (count, noun) {
        (1, noun) => format!("1 {}", noun),
        (count, "dependency") => format!("{} dependencies", count),
        (count, noun) => format!("{} {}s", count, noun),
    })
    .collect();

    if counts.is_empty() {
        output.success(&format!("Removed {} {}", what, id));
    } else {
        output.success(&format!("Removed {} {} (with {})", what, id, counts.join(", ")));
    }
}
