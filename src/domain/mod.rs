//! Scheduling rules for workplan
//!
//! Pure logic over records the caller has already loaded. Nothing in here
//! touches the filesystem.

mod admission;
mod calendar;
mod containment;
mod error;
mod graph;
mod id;
mod interval;
mod record;
mod validate;

pub use admission::{admit, Admission, AdmissionRequest, MAX_CONCURRENT_TASKS};
pub use calendar::{days_between, CalendarPreset, HolidayCalendar, WorkCalendar};
pub use containment::{first_child_outside, first_overlapping_sibling, within_parent, Dated};
pub use error::Rejection;
pub use graph::{would_create_cycle, DependencyGraph, GraphError};
pub use id::{IdError, ProjectId, RequirementId, TaskId, UserId};
pub use interval::{
    compare_end, earliest_end, overlaps, DateRange, HalfDaySlot, IntervalError, SlotPoint,
    TaskInterval,
};
pub use record::{
    DependencyEdge, Priority, Project, Requirement, Task, TaskPlacement, TaskStatus,
};
pub use validate::{
    check_dependency, validate_project, validate_requirement, validate_task, ProjectDraft,
    RequirementDraft, RequirementSnapshot, TaskDraft, TaskSnapshot,
};
