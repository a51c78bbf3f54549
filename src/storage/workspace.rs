//! Workspace management
//!
//! Handles workspace initialization and provides access to stores.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;

use super::config::WORKPLAN_DIR;
use super::{Config, RecordStore};
use crate::domain::{
    DependencyEdge, HolidayCalendar, Project, ProjectId, Requirement, RequirementId, Task, TaskId,
};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a workplan workspace. Run 'workplan init' first.")]
    NotInWorkspace,
}

const DEFAULT_CONFIG: &str = r#"# workplan configuration

[calendar]
# Built-in holiday table: "cn-mainland" or "weekends"
preset = "cn-mainland"
# Extra non-working dates
holidays = []
# Extra working dates (make-up days on weekends)
workdays = []

[defaults]
start_slot = "MORNING"
end_slot = "AFTERNOON"
"#;

/// Records deleted along with a removed project, requirement or task
#[derive(Debug, Default, Serialize)]
pub struct Cascade {
    pub requirements: Vec<RequirementId>,
    pub tasks: Vec<TaskId>,
    pub dependencies: Vec<DependencyEdge>,
}

/// Record counts after compaction, one per store
#[derive(Debug, Serialize)]
pub struct Compaction {
    pub projects: usize,
    pub requirements: usize,
    pub tasks: usize,
    pub dependencies: usize,
}

/// A workplan workspace: a directory containing `.workplan/`
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(WORKPLAN_DIR).is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_workspace(&root)?;
        tracing::debug!(root = %root.display(), "opened workspace");

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;
        Self::open(root)
    }

    /// Initializes a workspace at the given path
    ///
    /// Existing files are left alone, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let dir = root.join(WORKPLAN_DIR);

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {} directory: {}", WORKPLAN_DIR, dir.display()))?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.workplan` directory path
    pub fn dir(&self) -> PathBuf {
        self.root.join(WORKPLAN_DIR)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the configured working calendar
    pub fn calendar(&self) -> Result<HolidayCalendar> {
        self.config.calendar()
    }

    pub fn projects(&self) -> RecordStore<Project> {
        RecordStore::in_dir(&self.dir())
    }

    pub fn requirements(&self) -> RecordStore<Requirement> {
        RecordStore::in_dir(&self.dir())
    }

    pub fn tasks(&self) -> RecordStore<Task> {
        RecordStore::in_dir(&self.dir())
    }

    pub fn dependencies(&self) -> RecordStore<DependencyEdge> {
        RecordStore::in_dir(&self.dir())
    }

    /// Deletes a task and every dependency touching it
    pub fn remove_task(&self, id: TaskId) -> Result<Cascade> {
        if self.tasks().get(&id)?.is_none() {
            anyhow::bail!("Task not found: {}", id);
        }

        let dependencies = self.remove_edges(&BTreeSet::from([id]))?;
        self.tasks().remove(&id)?;
        tracing::debug!(%id, dependencies = dependencies.len(), "task removed");

        Ok(Cascade {
            dependencies,
            ..Cascade::default()
        })
    }

    /// Deletes a requirement together with its tasks and their dependencies
    pub fn remove_requirement(&self, id: RequirementId) -> Result<Cascade> {
        if self.requirements().get(&id)?.is_none() {
            anyhow::bail!("Requirement not found: {}", id);
        }

        let requirements = BTreeSet::from([id]);
        let cascade = self.remove_children(&requirements)?;
        self.requirements().remove(&id)?;
        tracing::debug!(%id, tasks = cascade.tasks.len(), "requirement removed");

        Ok(cascade)
    }

    /// Deletes a project together with its requirements, their tasks and
    /// the dependencies of those tasks
    pub fn remove_project(&self, id: ProjectId) -> Result<Cascade> {
        if self.projects().get(&id)?.is_none() {
            anyhow::bail!("Project not found: {}", id);
        }

        let requirements: BTreeSet<RequirementId> = self
            .requirements()
            .list()?
            .into_iter()
            .filter(|r| r.project == Some(id))
            .map(|r| r.id)
            .collect();

        // Children go first so an interrupted removal never leaves orphans
        let mut cascade = self.remove_children(&requirements)?;
        self.requirements()
            .retain(|r| !requirements.contains(&r.id))?;
        self.projects().remove(&id)?;

        cascade.requirements = requirements.into_iter().collect();
        tracing::debug!(
            %id,
            requirements = cascade.requirements.len(),
            tasks = cascade.tasks.len(),
            "project removed"
        );

        Ok(cascade)
    }

    /// Rewrites every store with one line per record
    pub fn compact(&self) -> Result<Compaction> {
        Ok(Compaction {
            projects: self.projects().compact()?,
            requirements: self.requirements().compact()?,
            tasks: self.tasks().compact()?,
            dependencies: self.dependencies().compact()?,
        })
    }

    /// Deletes the tasks under `requirements` and their dependencies
    fn remove_children(&self, requirements: &BTreeSet<RequirementId>) -> Result<Cascade> {
        let tasks: BTreeSet<TaskId> = self
            .tasks()
            .list()?
            .into_iter()
            .filter(|t| t.requirement().is_some_and(|r| requirements.contains(&r)))
            .map(|t| t.id)
            .collect();

        let dependencies = self.remove_edges(&tasks)?;
        self.tasks().retain(|t| !tasks.contains(&t.id))?;

        Ok(Cascade {
            requirements: Vec::new(),
            tasks: tasks.into_iter().collect(),
            dependencies,
        })
    }

    fn remove_edges(&self, tasks: &BTreeSet<TaskId>) -> Result<Vec<DependencyEdge>> {
        self.dependencies()
            .retain(|e| !tasks.contains(&e.predecessor) && !tasks.contains(&e.successor))
    }
}
