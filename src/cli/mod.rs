//! # Command-Line Interface
//!
//! User-facing commands and output formatting. Each write command reads the
//! current records, runs them through the domain checks and only persists
//! when the write is accepted.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace setup | `init` |
//! | Project | Top-level date ranges | `project add`, `project remove` |
//! | Requirement | Ranges inside projects | `req add`, `req remove` |
//! | Task | Scheduling people | `task add`, `task update`, `task remove` |
//! | Dependency | Ordering tasks | `dep add`, `dep list`, `order` |
//! | Calendar | Workday arithmetic | `calendar is-workday`, `calendar add` |
//! | Maintenance | Tidying the record files | `compact` |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON; rejected writes print the structured
//!   rejection on stdout
//!
//! ## Verbose Mode
//!
//! `--verbose` (or `-v`) turns on debug logging on stderr; `WORKPLAN_LOG`
//! takes a `tracing` filter otherwise:
//! ```bash
//! WORKPLAN_LOG=workplan=trace workplan task add ...
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod calendar;
mod compact;
mod dependency;
mod logging;
mod output;
mod project;
mod requirement;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
