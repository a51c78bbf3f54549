//! Project CLI commands

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use super::app::{date_range, range_text, report_removal};
use super::output::Output;
use crate::domain::{validate_project, Priority, Project, ProjectDraft, ProjectId};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project
    Add {
        /// Project title
        title: String,

        /// Priority, 0 (highest) to 5
        #[arg(long, short, default_value = "0", allow_negative_numbers = true)]
        priority: i64,

        /// Free-form description
        #[arg(long, short)]
        description: Option<String>,

        /// First day of the project (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// Last day of the project (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },

    /// Change a project's fields
    Update {
        /// Project ID
        id: ProjectId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, short, allow_negative_numbers = true)]
        priority: Option<i64>,

        #[arg(long, short)]
        description: Option<String>,

        /// New first day; requirements must still fit
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// New last day; requirements must still fit
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },

    /// List projects
    List,

    /// Show project details and its requirements
    Show {
        /// Project ID
        id: ProjectId,
    },

    /// Delete a project along with its requirements and their tasks
    Remove {
        /// Project ID
        id: ProjectId,
    },
}

pub fn run(cmd: ProjectCommands, output: &Output) -> Result<()> {
    match cmd {
        ProjectCommands::Add {
            title,
            priority,
            description,
            start,
            end,
        } => add_project(output, title, priority, description, start, end),
        ProjectCommands::Update {
            id,
            title,
            priority,
            description,
            start,
            end,
        } => update_project(output, id, title, priority, description, start, end),
        ProjectCommands::List => list_projects(output),
        ProjectCommands::Show { id } => show_project(output, id),
        ProjectCommands::Remove { id } => {
            let workspace = Workspace::open_current()?;
            let cascade = workspace.remove_project(id)?;
            report_removal(output, "project", &id, &cascade);
            Ok(())
        }
    }
}

fn add_project(
    output: &Output,
    title: String,
    priority: i64,
    description: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let priority = Priority::new(priority)?;
    let range = date_range(start, end)?;

    let workspace = Workspace::open_current()?;
    let store = workspace.projects();
    let existing = store.read_all()?;

    let mut project = Project::new(ProjectId::next_after(existing.keys()), title, priority);
    project.description = description;
    if let Some(range) = range {
        project = project.with_range(range);
    }

    store.append(&project)?;
    tracing::debug!(id = %project.id, "project created");

    if output.is_json() {
        output.data(&project);
    } else {
        output.success(&format!("Created project: {} - {}", project.id, project.title));
    }

    Ok(())
}

fn update_project(
    output: &Output,
    id: ProjectId,
    title: Option<String>,
    priority: Option<i64>,
    description: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let priority = priority.map(Priority::new).transpose()?;
    let range = date_range(start, end)?;

    let workspace = Workspace::open_current()?;
    let store = workspace.projects();
    let mut project = store
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Project not found: {}", id))?;

    if range.is_some() {
        let draft = ProjectDraft {
            editing: Some(id),
            range,
        };
        let requirements = workspace.requirements().list()?;
        validate_project(&draft, &requirements)?;
        project.range = range;
    }

    if let Some(title) = title {
        project.title = title;
    }
    if let Some(priority) = priority {
        project.priority = priority;
    }
    if description.is_some() {
        project.description = description;
    }
    project.updated_at = Utc::now();

    store.update(&project)?;

    if output.is_json() {
        output.data(&project);
    } else {
        output.success(&format!("Updated project: {} - {}", project.id, project.title));
    }

    Ok(())
}

fn list_projects(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let mut projects = workspace.projects().list()?;
    projects.sort_by_key(|p| (p.priority, p.id));

    if output.is_json() {
        output.data(&projects);
    } else if projects.is_empty() {
        println!("No projects");
    } else {
        println!("{:<8} {:<4} {:<26} TITLE", "ID", "PRI", "DATES");
        println!("{}", "-".repeat(70));
        for project in &projects {
            println!(
                "{:<8} {:<4} {:<26} {}",
                project.id,
                project.priority,
                range_text(project.range.as_ref()),
                project.title
            );
        }
    }

    Ok(())
}

fn show_project(output: &Output, id: ProjectId) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let project = workspace
        .projects()
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Project not found: {}", id))?;

    let requirements: Vec<_> = workspace
        .requirements()
        .list()?
        .into_iter()
        .filter(|r| r.project == Some(id))
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "project": project,
            "requirements": requirements,
        }));
        return Ok(());
    }

    println!("ID:          {}", project.id);
    println!("Title:       {}", project.title);
    println!("Priority:    {}", project.priority);
    println!("Dates:       {}", range_text(project.range.as_ref()));
    if let Some(description) = &project.description {
        println!("Description: {}", description);
    }

    if !requirements.is_empty() {
        println!();
        println!("Requirements:");
        for requirement in &requirements {
            println!(
                "  {} {} ({})",
                requirement.id,
                requirement.title,
                range_text(requirement.range.as_ref())
            );
        }
    }

    Ok(())
}
