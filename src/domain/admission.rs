//! Per-person concurrency admission control
//!
//! A person may run at most two tasks at the same time, and two concurrent
//! tasks must carry different priorities so it is clear which one comes
//! first. A proposal that would break either rule is rejected; for the
//! capacity case the rejection carries the earliest half-day at which one of
//! the colliding tasks has finished.
//!
//! Overlap uses [`TaskInterval::slot_conflict`]: half-day precision for two
//! single-day tasks on the same date, whole-date precision otherwise.

use std::iter;

use super::error::Rejection;
use super::id::{TaskId, UserId};
use super::interval::{earliest_end, SlotPoint, TaskInterval};
use super::record::{Priority, Task};

/// Most tasks one person may run at the same time
pub const MAX_CONCURRENT_TASKS: usize = 2;

/// A proposed placement of a task on someone's schedule
#[derive(Debug, Clone, Copy)]
pub struct AdmissionRequest<'a> {
    pub assignee: &'a UserId,
    pub interval: TaskInterval,
    pub priority: Priority,
    /// The task being edited, excluded from the comparison
    pub editing: Option<TaskId>,
}

/// Verdict of [`admit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Accept,
    CapacityExceeded {
        /// Earliest half-day after one of the colliding tasks ends
        suggested: SlotPoint,
        conflicting: Vec<TaskId>,
    },
    PriorityCollision {
        conflicting_id: TaskId,
        priority: Priority,
    },
}

impl Admission {
    /// Converts a rejection verdict into its [`Rejection`]
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Admission::Accept => Ok(()),
            Admission::CapacityExceeded { suggested, .. } => Err(Rejection::CapacityExceeded {
                suggested_date: suggested.date,
                suggested_slot: suggested.slot,
            }),
            Admission::PriorityCollision {
                conflicting_id,
                priority,
            } => Err(Rejection::PriorityCollision {
                conflicting_id,
                priority,
            }),
        }
    }
}

/// Decides whether `request` fits next to the person's existing tasks
///
/// `existing` may contain other people's tasks and the task being edited;
/// both are ignored.
pub fn admit<'a>(
    request: &AdmissionRequest<'_>,
    existing: impl IntoIterator<Item = &'a Task>,
) -> Admission {
    let overlapping: Vec<&Task> = existing
        .into_iter()
        .filter(|t| &t.assignee == request.assignee)
        .filter(|t| Some(t.id) != request.editing)
        .filter(|t| t.interval.slot_conflict(&request.interval))
        .collect();

    tracing::trace!(
        assignee = %request.assignee,
        interval = %request.interval,
        overlapping = overlapping.len(),
        "admission check"
    );

    if overlapping.len() >= MAX_CONCURRENT_TASKS {
        let ends = overlapping
            .iter()
            .map(|t| &t.interval)
            .chain(iter::once(&request.interval));
        let suggested = earliest_end(ends)
            .map(|interval| interval.end().next())
            .unwrap_or_else(|| request.interval.end().next());

        return Admission::CapacityExceeded {
            suggested,
            conflicting: overlapping.iter().map(|t| t.id).collect(),
        };
    }

    // Below the cap, every concurrent task needs its own priority
    match overlapping.iter().find(|t| t.priority == request.priority) {
        Some(clash) => Admission::PriorityCollision {
            conflicting_id: clash.id,
            priority: clash.priority,
        },
        None => Admission::Accept,
    }
}
