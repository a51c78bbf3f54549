//! Task CLI commands

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Subcommand, ValueEnum};

use super::app::report_removal;
use super::output::Output;
use crate::domain::{
    validate_task, DependencyGraph, HalfDaySlot, Priority, RequirementId, Task, TaskDraft,
    TaskId, TaskInterval, TaskPlacement, TaskSnapshot, TaskStatus, UserId,
};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Schedule a task
    ///
    /// Examples:
    ///   workplan task add "Login API" -a alice -p 1 --start 2024-03-05 --days 3
    ///   workplan task add "Search UI" -a bob -p 2 -r R-001 --start 2024-03-05 --days 2
    Add {
        /// Task title
        title: String,

        /// Person doing the work (defaults to the global default_assignee)
        #[arg(long, short)]
        assignee: Option<UserId>,

        /// Priority, 0 (highest) to 5
        #[arg(long, short, allow_negative_numbers = true)]
        priority: i64,

        /// Requirement the task belongs to (standalone if omitted)
        #[arg(long, short)]
        requirement: Option<RequirementId>,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Length in workdays, counting the first day
        #[arg(long)]
        days: u32,

        /// Half-day the task starts in (morning/afternoon)
        #[arg(long)]
        start_slot: Option<HalfDaySlot>,

        /// Half-day the task ends in (morning/afternoon)
        #[arg(long)]
        end_slot: Option<HalfDaySlot>,
    },

    /// Reschedule or edit a task
    Update {
        /// Task ID
        id: TaskId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, short)]
        assignee: Option<UserId>,

        #[arg(long, short, allow_negative_numbers = true)]
        priority: Option<i64>,

        /// Move under a requirement
        #[arg(long, short, conflicts_with = "standalone")]
        requirement: Option<RequirementId>,

        /// Detach from its requirement
        #[arg(long)]
        standalone: bool,

        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long)]
        days: Option<u32>,

        #[arg(long)]
        start_slot: Option<HalfDaySlot>,

        #[arg(long)]
        end_slot: Option<HalfDaySlot>,
    },

    /// List tasks
    List {
        /// Only tasks of this person
        #[arg(long, short)]
        assignee: Option<UserId>,

        /// Only tasks of this requirement
        #[arg(long, short, conflicts_with = "standalone")]
        requirement: Option<RequirementId>,

        /// Only standalone tasks
        #[arg(long)]
        standalone: bool,
    },

    /// Show task details
    Show {
        /// Task ID
        id: TaskId,
    },

    /// Set a task's status
    Status {
        /// Task ID
        id: TaskId,

        /// New status
        status: StatusArg,
    },

    /// Delete a task and its dependencies
    Remove {
        /// Task ID
        id: TaskId,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Todo,
    InProgress,
    Done,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Todo => TaskStatus::Todo,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Done => TaskStatus::Done,
        }
    }
}

/// Field changes requested by `task update`
struct TaskChanges {
    title: Option<String>,
    assignee: Option<UserId>,
    priority: Option<i64>,
    requirement: Option<RequirementId>,
    standalone: bool,
    start: Option<NaiveDate>,
    days: Option<u32>,
    start_slot: Option<HalfDaySlot>,
    end_slot: Option<HalfDaySlot>,
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            assignee,
            priority,
            requirement,
            start,
            days,
            start_slot,
            end_slot,
        } => {
            let workspace = Workspace::open_current()?;
            let defaults = workspace.config().workspace.defaults;
            let assignee = match assignee {
                Some(assignee) => assignee,
                None => default_assignee(&workspace)?,
            };

            let draft = TaskDraft {
                editing: None,
                assignee,
                priority: Priority::new(priority)?,
                placement: requirement.map_or(TaskPlacement::Standalone, TaskPlacement::InRequirement),
                start_date: start,
                start_slot: start_slot.unwrap_or(defaults.start_slot),
                duration_workdays: days,
                end_slot: end_slot.unwrap_or(defaults.end_slot),
            };
            add_task(&workspace, output, title, draft)
        }
        TaskCommands::Update {
            id,
            title,
            assignee,
            priority,
            requirement,
            standalone,
            start,
            days,
            start_slot,
            end_slot,
        } => {
            let changes = TaskChanges {
                title,
                assignee,
                priority,
                requirement,
                standalone,
                start,
                days,
                start_slot,
                end_slot,
            };
            update_task(output, id, changes)
        }
        TaskCommands::List {
            assignee,
            requirement,
            standalone,
        } => list_tasks(output, assignee.as_ref(), requirement, standalone),
        TaskCommands::Show { id } => show_task(output, id),
        TaskCommands::Status { id, status } => set_status(output, id, status.into()),
        TaskCommands::Remove { id } => {
            let workspace = Workspace::open_current()?;
            let cascade = workspace.remove_task(id)?;
            report_removal(output, "task", &id, &cascade);
            Ok(())
        }
    }
}

fn default_assignee(workspace: &Workspace) -> Result<UserId> {
    let name = workspace
        .config()
        .global
        .default_assignee
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No assignee given and no default_assignee configured"))?;
    name.parse()
        .context("Invalid default_assignee in global config")
}

fn find_task(workspace: &Workspace, id: TaskId) -> Result<Task> {
    workspace
        .tasks()
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
}

/// Reads the snapshot for `draft` and runs the task pipeline
fn validate(workspace: &Workspace, draft: &TaskDraft) -> Result<TaskInterval> {
    let requirement = match draft.placement.requirement() {
        Some(id) => Some(
            workspace
                .requirements()
                .get(&id)?
                .ok_or_else(|| anyhow::anyhow!("Requirement not found: {}", id))?,
        ),
        None => None,
    };

    let assignee_tasks: Vec<Task> = workspace
        .tasks()
        .list()?
        .into_iter()
        .filter(|t| t.assignee == draft.assignee)
        .collect();

    let calendar = workspace.calendar()?;
    let snapshot = TaskSnapshot {
        requirement: requirement.as_ref(),
        assignee_tasks: &assignee_tasks,
    };

    Ok(validate_task(draft, snapshot, &calendar)?)
}

fn add_task(workspace: &Workspace, output: &Output, title: String, draft: TaskDraft) -> Result<()> {
    let interval = validate(workspace, &draft)?;

    let store = workspace.tasks();
    let existing = store.read_all()?;
    let id = TaskId::next_after(existing.keys());

    let task = Task::new(id, title, draft.assignee, draft.priority, interval)
        .with_duration(draft.duration_workdays);
    let task = match draft.placement.requirement() {
        Some(requirement) => task.in_requirement(requirement),
        None => task,
    };

    store.append(&task)?;
    tracing::debug!(id = %task.id, "task created");

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!(
            "Created task: {} - {} ({}, {})",
            task.id, task.title, task.assignee, task.interval
        ));
    }

    Ok(())
}

fn update_task(output: &Output, id: TaskId, changes: TaskChanges) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut task = find_task(&workspace, id)?;

    let placement = if changes.standalone {
        TaskPlacement::Standalone
    } else {
        changes
            .requirement
            .map_or(task.placement, TaskPlacement::InRequirement)
    };
    let priority = match changes.priority {
        Some(priority) => Priority::new(priority)?,
        None => task.priority,
    };

    let draft = TaskDraft {
        editing: Some(id),
        assignee: changes.assignee.unwrap_or_else(|| task.assignee.clone()),
        priority,
        placement,
        start_date: changes.start.unwrap_or(task.interval.start().date),
        start_slot: changes.start_slot.unwrap_or(task.interval.start().slot),
        duration_workdays: changes.days.unwrap_or(task.duration_workdays),
        end_slot: changes.end_slot.unwrap_or(task.interval.end().slot),
    };
    let interval = validate(&workspace, &draft)?;

    if let Some(title) = changes.title {
        task.title = title;
    }
    task.assignee = draft.assignee;
    task.priority = draft.priority;
    task.placement = draft.placement;
    task.interval = interval;
    task.duration_workdays = draft.duration_workdays;
    task.updated_at = Utc::now();

    workspace.tasks().update(&task)?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!(
            "Updated task: {} - {} ({}, {})",
            task.id, task.title, task.assignee, task.interval
        ));
    }

    Ok(())
}

fn list_tasks(
    output: &Output,
    assignee: Option<&UserId>,
    requirement: Option<RequirementId>,
    standalone_only: bool,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut tasks: Vec<Task> = workspace
        .tasks()
        .list()?
        .into_iter()
        .filter(|t| assignee.map_or(true, |a| &t.assignee == a))
        .filter(|t| requirement.is_none() || t.requirement() == requirement)
        .filter(|t| !standalone_only || t.is_standalone())
        .collect();
    tasks.sort_by_key(|t| (t.priority, t.id));

    if output.is_json() {
        output.data(&tasks);
    } else if tasks.is_empty() {
        println!("No tasks");
    } else {
        println!(
            "{:<8} {:<4} {:<12} {:<12} {:<8} {:<42} TITLE",
            "ID", "PRI", "STATUS", "ASSIGNEE", "REQ", "SCHEDULE"
        );
        println!("{}", "-".repeat(110));
        for task in &tasks {
            let requirement = task
                .requirement()
                .map_or_else(|| "-".to_string(), |r| r.to_string());
            println!(
                "{:<8} {:<4} {:<12} {:<12} {:<8} {:<42} {}",
                task.id,
                task.priority,
                task.status.label(),
                task.assignee,
                requirement,
                task.interval.to_string(),
                task.title
            );
        }
    }

    Ok(())
}

fn show_task(output: &Output, id: TaskId) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let task = find_task(&workspace, id)?;

    let edges = workspace.dependencies().list()?;
    let graph = DependencyGraph::from_edges(&edges);
    let predecessors = graph.predecessors(&id);
    let successors = graph.successors(&id);

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task,
            "predecessors": predecessors,
            "successors": successors,
        }));
        return Ok(());
    }

    println!("ID:        {}", task.id);
    println!("Title:     {}", task.title);
    println!("Assignee:  {}", task.assignee);
    println!("Priority:  {}", task.priority);
    println!("Status:    {}", task.status.label());
    match task.requirement() {
        Some(requirement) => println!("Placement: {}", requirement),
        None => println!("Placement: standalone"),
    }
    println!("Schedule:  {}", task.interval);
    println!("Workdays:  {}", task.duration_workdays);

    if !predecessors.is_empty() {
        println!();
        println!("After:");
        for pred in &predecessors {
            println!("  {}", pred);
        }
    }

    if !successors.is_empty() {
        println!();
        println!("Before:");
        for succ in &successors {
            println!("  {}", succ);
        }
    }

    Ok(())
}

fn set_status(output: &Output, id: TaskId, status: TaskStatus) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut task = find_task(&workspace, id)?;

    task.set_status(status);
    workspace.tasks().update(&task)?;

    output.success(&format!("Task {} is now {}", task.id, status.label()));
    Ok(())
}
