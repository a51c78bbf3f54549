//! Rejection reasons for scheduling writes
//!
//! Every variant is a recoverable validation verdict: the caller shows the
//! message, the user corrects the input and resubmits. Serialized with a
//! `kind` tag so JSON consumers can branch on it (and pick up the suggested
//! restart slot for capacity rejections).

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::graph::GraphError;
use super::id::{RequirementId, TaskId};
use super::interval::{DateRange, HalfDaySlot, SlotPoint, TaskInterval};
use super::record::Priority;

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Priority must be between 0 and 5, got {value}")]
    InvalidPriority { value: i64 },

    #[error("Task would end before it starts: {start} to {end}")]
    InvertedInterval { start: SlotPoint, end: SlotPoint },

    #[error("Dates {child} must lie within {parent_id} dates {parent}")]
    ContainmentViolation {
        parent_id: String,
        parent: DateRange,
        child: DateRange,
    },

    #[error(
        "Dates overlap requirement {conflicting_id} \"{title}\" ({range}); requirements in one project cannot overlap"
    )]
    SiblingOverlap {
        conflicting_id: RequirementId,
        title: String,
        range: DateRange,
    },

    #[error("Cannot change dates: {child_id} \"{title}\" ({range}) falls outside the new range")]
    ChildOutsideRange {
        child_id: String,
        title: String,
        range: DateRange,
    },

    #[error("Time conflict: assignee already has {conflicting_id} ({interval}) in the same requirement")]
    SlotConflict {
        conflicting_id: TaskId,
        interval: TaskInterval,
    },

    #[error(
        "Assignee already has 2 concurrent tasks in this period; earliest suggested start is {suggested_date} {suggested_slot}"
    )]
    CapacityExceeded {
        suggested_date: NaiveDate,
        suggested_slot: HalfDaySlot,
    },

    #[error("Concurrent tasks must have different priorities: {conflicting_id} already runs at priority {priority}")]
    PriorityCollision {
        conflicting_id: TaskId,
        priority: Priority,
    },

    #[error("Task cannot depend on itself: {task}")]
    SelfReference { task: TaskId },

    #[error("Adding dependency would create a cycle: {predecessor} -> {successor}")]
    WouldCreateCycle { predecessor: TaskId, successor: TaskId },

    #[error("Dependency already exists: {predecessor} -> {successor}")]
    DuplicateEdge { predecessor: TaskId, successor: TaskId },
}

impl From<GraphError> for Rejection {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::SelfReference(task) => Rejection::SelfReference { task },
            GraphError::WouldCreateCycle {
                predecessor,
                successor,
            } => Rejection::WouldCreateCycle {
                predecessor,
                successor,
            },
            GraphError::DuplicateEdge {
                predecessor,
                successor,
            } => Rejection::DuplicateEdge {
                predecessor,
                successor,
            },
        }
    }
}

impl Rejection {
    /// Stable machine-readable name of the rejection
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::InvalidPriority { .. } => "invalid_priority",
            Rejection::InvertedInterval { .. } => "inverted_interval",
            Rejection::ContainmentViolation { .. } => "containment_violation",
            Rejection::SiblingOverlap { .. } => "sibling_overlap",
            Rejection::ChildOutsideRange { .. } => "child_outside_range",
            Rejection::SlotConflict { .. } => "slot_conflict",
            Rejection::CapacityExceeded { .. } => "capacity_exceeded",
            Rejection::PriorityCollision { .. } => "priority_collision",
            Rejection::SelfReference { .. } => "self_reference",
            Rejection::WouldCreateCycle { .. } => "would_create_cycle",
            Rejection::DuplicateEdge { .. } => "duplicate_edge",
        }
    }
}
