//! # Storage Layer
//!
//! Plain record persistence for workplan, kept in git-friendly files.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Projects | JSONL (one JSON per line) | `.workplan/projects.jsonl` |
//! | Requirements | JSONL | `.workplan/requirements.jsonl` |
//! | Tasks | JSONL | `.workplan/tasks.jsonl` |
//! | Dependencies | JSONL | `.workplan/dependencies.jsonl` |
//! | Config | TOML | `.workplan/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`RecordStore`] takes `fs2` file locks around each read and write
//! - Full rewrites are atomic (temp file + rename)
//! - Validation and the following write are not serialized; two processes
//!   can both pass validation against the same snapshot
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for accessing a workplan workspace
//! - [`RecordStore`] - Read/write one record kind as JSONL
//! - [`Config`] - Workspace and global configuration

mod config;
mod jsonl;
mod workspace;

pub use config::{
    CalendarConfig, Config, ConfigError, DefaultsConfig, GlobalConfig, OutputFormat,
    WorkspaceConfig, WORKPLAN_DIR,
};
pub use jsonl::{Record, RecordStore};
pub use workspace::{Cascade, Compaction, Workspace, WorkspaceError};
