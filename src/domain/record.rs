//! Scheduling records
//!
//! Projects contain requirements, requirements contain tasks. Tasks can also
//! be standalone. The engine reads these records; it never owns or mutates
//! persisted state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::Rejection;
use super::id::{ProjectId, RequirementId, TaskId, UserId};
use super::interval::{DateRange, TaskInterval};

/// Task priority, 0 (highest) to 5 (lowest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    /// Validates a raw priority value
    pub fn new(value: i64) -> Result<Self, Rejection> {
        if !(0..=5).contains(&value) {
            return Err(Rejection::InvalidPriority { value });
        }
        Ok(Self(value as u8))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Priority {
    type Error = Rejection;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        i64::from(priority.0)
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Where a task lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "requirement", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPlacement {
    InRequirement(RequirementId),
    #[default]
    Standalone,
}

impl TaskPlacement {
    pub fn requirement(&self) -> Option<RequirementId> {
        match self {
            TaskPlacement::InRequirement(id) => Some(*id),
            TaskPlacement::Standalone => None,
        }
    }
}

/// A scheduled unit of work assigned to one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub assignee: UserId,
    pub priority: Priority,
    #[serde(default)]
    pub placement: TaskPlacement,
    pub interval: TaskInterval,
    /// Planned length in workdays, used to resolve the end date
    #[serde(default)]
    pub duration_workdays: u32,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a standalone task
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        assignee: UserId,
        priority: Priority,
        interval: TaskInterval,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            assignee,
            priority,
            placement: TaskPlacement::Standalone,
            interval,
            duration_workdays: 0,
            status: TaskStatus::Todo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Places the task under a requirement
    pub fn in_requirement(mut self, requirement: RequirementId) -> Self {
        self.placement = TaskPlacement::InRequirement(requirement);
        self
    }

    pub fn with_duration(mut self, workdays: u32) -> Self {
        self.duration_workdays = workdays;
        self
    }

    pub fn requirement(&self) -> Option<RequirementId> {
        self.placement.requirement()
    }

    /// Returns true if this is a standalone task
    pub fn is_standalone(&self) -> bool {
        matches!(self.placement, TaskPlacement::Standalone)
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// A requirement, optionally inside a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: RequirementId,
    pub title: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Requirement {
    pub fn new(id: RequirementId, title: impl Into<String>, priority: Priority) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            priority,
            project: None,
            range: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// A top-level project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: ProjectId, title: impl Into<String>, priority: Priority) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: None,
            priority,
            range: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// "`predecessor` must happen before `successor`"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub predecessor: TaskId,
    pub successor: TaskId,
}

impl DependencyEdge {
    pub fn new(predecessor: TaskId, successor: TaskId) -> Self {
        Self {
            predecessor,
            successor,
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.predecessor, self.successor)
    }
}
