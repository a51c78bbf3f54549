//! Configuration handling for workplan
//!
//! Configuration is stored in `.workplan/config.toml` (workspace) and
//! `~/.config/workplan/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Weekday};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CalendarPreset, HalfDaySlot, HolidayCalendar};

/// Name of the per-workspace directory
pub const WORKPLAN_DIR: &str = ".workplan";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Working calendar settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CalendarConfig {
    /// Built-in rule table to start from
    pub preset: CalendarPreset,

    /// Extra non-working dates
    pub holidays: Vec<NaiveDate>,

    /// Extra working dates, even on weekends or holidays
    pub workdays: Vec<NaiveDate>,

    /// Overrides the preset's weekend days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekend: Option<Vec<Weekday>>,
}

impl CalendarConfig {
    /// Builds the calendar described by this section
    pub fn build(&self) -> Result<HolidayCalendar, ConfigError> {
        let mut calendar = self.preset.calendar();
        if let Some(weekend) = &self.weekend {
            calendar = calendar.with_weekend(weekend.iter().copied());
        }

        // Without a working weekday, add_workdays would scan every date up to NaiveDate::MAX
        if !calendar.has_regular_workdays() {
            return Err(ConfigError::Invalid(
                "calendar.weekend must leave at least one working weekday".to_string(),
            ));
        }

        Ok(calendar
            .with_holidays(self.holidays.iter().copied())
            .with_workdays(self.workdays.iter().copied()))
    }
}

/// Slots used when a command does not name one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DefaultsConfig {
    pub start_slot: HalfDaySlot,
    pub end_slot: HalfDaySlot,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            start_slot: HalfDaySlot::Morning,
            end_slot: HalfDaySlot::Afternoon,
        }
    }
}

/// Workspace-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub calendar: CalendarConfig,
    pub defaults: DefaultsConfig,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Assignee used by `task add` when `--assignee` is omitted
    pub default_assignee: Option<String>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + workspace)
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub global: GlobalConfig,
    pub workspace_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let workspace_root = Self::find_workspace_root();
        let workspace = match &workspace_root {
            Some(root) => Self::load_workspace_config(root)?,
            None => WorkspaceConfig::default(),
        };

        Ok(Self {
            workspace,
            global,
            workspace_root,
        })
    }

    /// Loads configuration for a specific workspace
    pub fn for_workspace(root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let workspace = Self::load_workspace_config(root)?;

        Ok(Self {
            workspace,
            global,
            workspace_root: Some(root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "workplan", "workplan")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads the global configuration, or defaults if there is none
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    fn load_workspace_config(root: &Path) -> Result<WorkspaceConfig> {
        let config_path = root.join(WORKPLAN_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(WorkspaceConfig::default());
        }

        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read workspace config: {}", config_path.display())
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse workspace config")
    }

    /// Finds the workspace root by looking for a `.workplan/` directory
    pub fn find_workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_workspace_root_from(&current)
    }

    /// Walks up from `start` looking for a `.workplan/` directory
    pub fn find_workspace_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(WORKPLAN_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the working calendar for this configuration
    pub fn calendar(&self) -> Result<HolidayCalendar> {
        self.workspace
            .calendar
            .build()
            .context("Failed to build working calendar")
    }
}
