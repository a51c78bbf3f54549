//! workplan - team task scheduling with workday-aware consistency checks
//!
//! Work is organised as projects containing requirements containing tasks.
//! Before any write is persisted the [`domain`] layer checks it:
//!
//! - task end dates are resolved on a working calendar (weekends, public
//!   holidays, make-up working days)
//! - tasks stay inside their requirement, requirements inside their project,
//!   and sibling requirements do not overlap
//! - nobody runs more than two tasks in the same half-day, and two concurrent
//!   tasks carry different priorities
//! - task dependencies stay acyclic
//!
//! The [`storage`] and [`cli`] layers are a thin local-first front end over
//! JSONL files.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{
    HalfDaySlot, Priority, Project, ProjectId, Rejection, Requirement, RequirementId, Task,
    TaskId, TaskInterval, WorkCalendar,
};
