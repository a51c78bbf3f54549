//! Write validation pipeline
//!
//! Each write (task, requirement, project, dependency) is described by a
//! typed draft and checked against a snapshot the caller has just read from
//! storage. Checks run in a fixed order and the first failure wins; an `Ok`
//! verdict means the caller may persist the write.
//!
//! Task pipeline:
//! 1. resolve the end date from start + workday duration
//! 2. containment in the requirement's dates
//! 3. no half-day clash with the assignee's other tasks in that requirement
//! 4. admission control over all of the assignee's tasks

use chrono::NaiveDate;

use super::admission::{admit, AdmissionRequest};
use super::calendar::WorkCalendar;
use super::containment::{first_child_outside, first_overlapping_sibling, within_parent};
use super::error::Rejection;
use super::graph::DependencyGraph;
use super::id::{ProjectId, RequirementId, TaskId, UserId};
use super::interval::{DateRange, HalfDaySlot, SlotPoint, TaskInterval};
use super::record::{DependencyEdge, Priority, Project, Requirement, Task, TaskPlacement};

/// Proposed task create or update
#[derive(Debug, Clone)]
pub struct TaskDraft {
    /// Set when updating an existing task
    pub editing: Option<TaskId>,
    pub assignee: UserId,
    pub priority: Priority,
    pub placement: TaskPlacement,
    pub start_date: NaiveDate,
    pub start_slot: HalfDaySlot,
    pub duration_workdays: u32,
    pub end_slot: HalfDaySlot,
}

/// State read from storage for a task write
#[derive(Debug, Clone, Copy)]
pub struct TaskSnapshot<'a> {
    /// The requirement named by the draft's placement, if any
    pub requirement: Option<&'a Requirement>,
    /// Every task currently assigned to the draft's assignee
    pub assignee_tasks: &'a [Task],
}

/// Validates a task write, returning the resolved interval
pub fn validate_task<C: WorkCalendar + ?Sized>(
    draft: &TaskDraft,
    snapshot: TaskSnapshot<'_>,
    calendar: &C,
) -> Result<TaskInterval, Rejection> {
    let end_date = calendar.add_workdays(draft.start_date, draft.duration_workdays);
    let start = SlotPoint::new(draft.start_date, draft.start_slot);
    let end = SlotPoint::new(end_date, draft.end_slot);
    let interval =
        TaskInterval::new(start, end).map_err(|_| Rejection::InvertedInterval { start, end })?;

    if let Some(requirement) = snapshot.requirement {
        let dates = interval.date_range();
        if !within_parent(&dates, requirement.range.as_ref()) {
            if let Some(parent) = requirement.range {
                return Err(Rejection::ContainmentViolation {
                    parent_id: requirement.id.to_string(),
                    parent,
                    child: dates,
                });
            }
        }

        let clash = snapshot
            .assignee_tasks
            .iter()
            .filter(|t| t.assignee == draft.assignee)
            .filter(|t| Some(t.id) != draft.editing)
            .filter(|t| t.requirement() == Some(requirement.id))
            .find(|t| t.interval.slot_conflict(&interval));
        if let Some(existing) = clash {
            return Err(Rejection::SlotConflict {
                conflicting_id: existing.id,
                interval: existing.interval,
            });
        }
    }

    let request = AdmissionRequest {
        assignee: &draft.assignee,
        interval,
        priority: draft.priority,
        editing: draft.editing,
    };
    admit(&request, snapshot.assignee_tasks).into_result()?;

    tracing::debug!(task = ?draft.editing, assignee = %draft.assignee, %interval, "task accepted");
    Ok(interval)
}

/// Proposed requirement create or update
#[derive(Debug, Clone)]
pub struct RequirementDraft {
    pub editing: Option<RequirementId>,
    pub project: Option<ProjectId>,
    pub range: Option<DateRange>,
}

/// State read from storage for a requirement write
#[derive(Debug, Clone, Copy)]
pub struct RequirementSnapshot<'a> {
    /// The project named by the draft, if any
    pub project: Option<&'a Project>,
    /// Requirements currently under that project
    pub siblings: &'a [Requirement],
    /// Tasks currently under the requirement being edited
    pub tasks: &'a [Task],
}

/// Validates a requirement write
pub fn validate_requirement(
    draft: &RequirementDraft,
    snapshot: RequirementSnapshot<'_>,
) -> Result<(), Rejection> {
    let Some(range) = draft.range else {
        return Ok(());
    };

    if let Some(project) = snapshot.project {
        if let Some(parent) = project.range {
            if !within_parent(&range, Some(&parent)) {
                return Err(Rejection::ContainmentViolation {
                    parent_id: project.id.to_string(),
                    parent,
                    child: range,
                });
            }
        }

        let siblings = snapshot
            .siblings
            .iter()
            .filter(|r| r.project == Some(project.id))
            .filter(|r| Some(r.id) != draft.editing);
        if let Some(sibling) = first_overlapping_sibling(&range, siblings) {
            return Err(Rejection::SiblingOverlap {
                conflicting_id: sibling.id,
                title: sibling.title.clone(),
                range: sibling.range.unwrap_or(range),
            });
        }
    }

    if let Some(editing) = draft.editing {
        let children = snapshot
            .tasks
            .iter()
            .filter(|t| t.requirement() == Some(editing));
        if let Some(task) = first_child_outside(&range, children) {
            return Err(Rejection::ChildOutsideRange {
                child_id: task.id.to_string(),
                title: task.title.clone(),
                range: task.interval.date_range(),
            });
        }
    }

    tracing::debug!(requirement = ?draft.editing, %range, "requirement accepted");
    Ok(())
}

/// Proposed project create or update
#[derive(Debug, Clone, Copy)]
pub struct ProjectDraft {
    pub editing: Option<ProjectId>,
    pub range: Option<DateRange>,
}

/// Validates a project's new dates against its requirements
///
/// A new project has no children yet, so only edits are checked.
pub fn validate_project(draft: &ProjectDraft, requirements: &[Requirement]) -> Result<(), Rejection> {
    let (Some(editing), Some(range)) = (draft.editing, draft.range) else {
        return Ok(());
    };

    let children = requirements.iter().filter(|r| r.project == Some(editing));
    if let Some(requirement) = first_child_outside(&range, children) {
        return Err(Rejection::ChildOutsideRange {
            child_id: requirement.id.to_string(),
            title: requirement.title.clone(),
            range: requirement.range.unwrap_or(range),
        });
    }

    tracing::debug!(project = %editing, %range, "project accepted");
    Ok(())
}

/// Validates a proposed dependency edge against the current edge snapshot
pub fn check_dependency(
    edges: &[DependencyEdge],
    predecessor: TaskId,
    successor: TaskId,
) -> Result<(), Rejection> {
    DependencyGraph::from_edges(edges).check_edge(&predecessor, &successor)?;
    tracing::debug!(%predecessor, %successor, "dependency accepted");
    Ok(())
}
