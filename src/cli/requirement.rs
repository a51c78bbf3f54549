//! Requirement CLI commands

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use super::app::{date_range, range_text, report_removal};
use super::output::Output;
use crate::domain::{
    validate_requirement, Priority, Project, ProjectId, Requirement, RequirementDraft,
    RequirementId, RequirementSnapshot, Task,
};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum RequirementCommands {
    /// Create a requirement, optionally inside a project
    Add {
        /// Requirement title
        title: String,

        /// Priority, 0 (highest) to 5
        #[arg(long, short, allow_negative_numbers = true)]
        priority: i64,

        /// Owning project
        #[arg(long)]
        project: Option<ProjectId>,

        /// First day (YYYY-MM-DD); must fall inside the project's dates
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },

    /// Change a requirement's fields
    Update {
        /// Requirement ID
        id: RequirementId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, short, allow_negative_numbers = true)]
        priority: Option<i64>,

        /// Move to another project
        #[arg(long)]
        project: Option<ProjectId>,

        /// New first day; tasks must still fit
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// New last day; tasks must still fit
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },

    /// List requirements
    List {
        /// Only requirements of this project
        #[arg(long)]
        project: Option<ProjectId>,
    },

    /// Show requirement details and its tasks
    Show {
        /// Requirement ID
        id: RequirementId,
    },

    /// Delete a requirement along with its tasks
    Remove {
        /// Requirement ID
        id: RequirementId,
    },
}

pub fn run(cmd: RequirementCommands, output: &Output) -> Result<()> {
    match cmd {
        RequirementCommands::Add {
            title,
            priority,
            project,
            start,
            end,
        } => add_requirement(output, title, priority, project, start, end),
        RequirementCommands::Update {
            id,
            title,
            priority,
            project,
            start,
            end,
        } => update_requirement(output, id, title, priority, project, start, end),
        RequirementCommands::List { project } => list_requirements(output, project),
        RequirementCommands::Show { id } => show_requirement(output, id),
        RequirementCommands::Remove { id } => {
            let workspace = Workspace::open_current()?;
            let cascade = workspace.remove_requirement(id)?;
            report_removal(output, "requirement", &id, &cascade);
            Ok(())
        }
    }
}

fn find_project(workspace: &Workspace, id: Option<ProjectId>) -> Result<Option<Project>> {
    match id {
        Some(id) => workspace
            .projects()
            .get(&id)?
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("Project not found: {}", id)),
        None => Ok(None),
    }
}

/// Runs the containment and overlap checks for a requirement write
fn check(workspace: &Workspace, draft: &RequirementDraft, all: &[Requirement]) -> Result<()> {
    let project = find_project(workspace, draft.project)?;
    let siblings: Vec<Requirement> = match draft.project {
        Some(project_id) => all
            .iter()
            .filter(|r| r.project == Some(project_id))
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    let tasks: Vec<Task> = match draft.editing {
        Some(id) => workspace
            .tasks()
            .list()?
            .into_iter()
            .filter(|t| t.requirement() == Some(id))
            .collect(),
        None => Vec::new(),
    };

    let snapshot = RequirementSnapshot {
        project: project.as_ref(),
        siblings: &siblings,
        tasks: &tasks,
    };
    validate_requirement(draft, snapshot)?;
    Ok(())
}

fn add_requirement(
    output: &Output,
    title: String,
    priority: i64,
    project: Option<ProjectId>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let priority = Priority::new(priority)?;
    let range = date_range(start, end)?;

    let workspace = Workspace::open_current()?;
    let store = workspace.requirements();
    let all = store.list()?;

    let draft = RequirementDraft {
        editing: None,
        project,
        range,
    };
    check(&workspace, &draft, &all)?;

    let mut requirement = Requirement::new(
        RequirementId::next_after(all.iter().map(|r| &r.id)),
        title,
        priority,
    );
    if let Some(project) = project {
        requirement = requirement.in_project(project);
    }
    if let Some(range) = range {
        requirement = requirement.with_range(range);
    }

    store.append(&requirement)?;
    tracing::debug!(id = %requirement.id, "requirement created");

    if output.is_json() {
        output.data(&requirement);
    } else {
        output.success(&format!(
            "Created requirement: {} - {}",
            requirement.id, requirement.title
        ));
    }

    Ok(())
}

fn update_requirement(
    output: &Output,
    id: RequirementId,
    title: Option<String>,
    priority: Option<i64>,
    project: Option<ProjectId>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let priority = priority.map(Priority::new).transpose()?;
    let range = date_range(start, end)?;

    let workspace = Workspace::open_current()?;
    let store = workspace.requirements();
    let all = store.list()?;
    let mut requirement = all
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Requirement not found: {}", id))?;

    let draft = RequirementDraft {
        editing: Some(id),
        project: project.or(requirement.project),
        range: range.or(requirement.range),
    };
    check(&workspace, &draft, &all)?;

    requirement.project = draft.project;
    requirement.range = draft.range;
    if let Some(title) = title {
        requirement.title = title;
    }
    if let Some(priority) = priority {
        requirement.priority = priority;
    }
    requirement.updated_at = Utc::now();

    store.update(&requirement)?;

    if output.is_json() {
        output.data(&requirement);
    } else {
        output.success(&format!(
            "Updated requirement: {} - {}",
            requirement.id, requirement.title
        ));
    }

    Ok(())
}

fn list_requirements(output: &Output, project: Option<ProjectId>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut requirements: Vec<_> = workspace
        .requirements()
        .list()?
        .into_iter()
        .filter(|r| project.is_none() || r.project == project)
        .collect();
    requirements.sort_by_key(|r| (r.priority, r.id));

    if output.is_json() {
        output.data(&requirements);
    } else if requirements.is_empty() {
        println!("No requirements");
    } else {
        println!("{:<8} {:<8} {:<4} {:<26} TITLE", "ID", "PROJECT", "PRI", "DATES");
        println!("{}", "-".repeat(78));
        for requirement in &requirements {
            let project = requirement
                .project
                .map_or_else(|| "-".to_string(), |p| p.to_string());
            println!(
                "{:<8} {:<8} {:<4} {:<26} {}",
                requirement.id,
                project,
                requirement.priority,
                range_text(requirement.range.as_ref()),
                requirement.title
            );
        }
    }

    Ok(())
}

fn show_requirement(output: &Output, id: RequirementId) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let requirement = workspace
        .requirements()
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Requirement not found: {}", id))?;

    let tasks: Vec<_> = workspace
        .tasks()
        .list()?
        .into_iter()
        .filter(|t| t.requirement() == Some(id))
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "requirement": requirement,
            "tasks": tasks,
        }));
        return Ok(());
    }

    println!("ID:       {}", requirement.id);
    println!("Title:    {}", requirement.title);
    println!("Priority: {}", requirement.priority);
    if let Some(project) = requirement.project {
        println!("Project:  {}", project);
    }
    println!("Dates:    {}", range_text(requirement.range.as_ref()));

    if !tasks.is_empty() {
        println!();
        println!("Tasks:");
        for task in &tasks {
            println!(
                "  {} [{}] {} ({}, {})",
                task.id,
                task.status.label(),
                task.title,
                task.assignee,
                task.interval
            );
        }
    }

    Ok(())
}
