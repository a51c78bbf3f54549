//! Dependency CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{check_dependency, DependencyEdge, DependencyGraph, TaskId};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum DependencyCommands {
    /// Record that one task must happen before another
    ///
    /// Example:
    ///   workplan dep add T-001 T-002    # T-001 before T-002
    Add {
        /// Task that must happen first
        predecessor: TaskId,

        /// Task that waits on the predecessor
        successor: TaskId,
    },

    /// Remove a dependency
    Remove {
        predecessor: TaskId,
        successor: TaskId,
    },

    /// List dependencies, optionally around one task
    List {
        /// Only edges touching this task
        task: Option<TaskId>,
    },
}

pub fn run(cmd: DependencyCommands, output: &Output) -> Result<()> {
    match cmd {
        DependencyCommands::Add {
            predecessor,
            successor,
        } => add_dependency(output, predecessor, successor),
        DependencyCommands::Remove {
            predecessor,
            successor,
        } => remove_dependency(output, predecessor, successor),
        DependencyCommands::List { task } => list_dependencies(output, task),
    }
}

fn add_dependency(output: &Output, predecessor: TaskId, successor: TaskId) -> Result<()> {
    let workspace = Workspace::open_current()?;

    let tasks = workspace.tasks().read_all()?;
    for id in [predecessor, successor] {
        if !tasks.contains_key(&id) {
            anyhow::bail!("Task not found: {}", id);
        }
    }

    let store = workspace.dependencies();
    let edges = store.list()?;
    check_dependency(&edges, predecessor, successor)?;

    let edge = DependencyEdge::new(predecessor, successor);
    store.append(&edge)?;

    if output.is_json() {
        output.data(&edge);
    } else {
        output.success(&format!("Added dependency: {}", edge));
    }

    Ok(())
}

fn remove_dependency(output: &Output, predecessor: TaskId, successor: TaskId) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let edge = DependencyEdge::new(predecessor, successor);

    if !workspace.dependencies().remove(&edge)? {
        anyhow::bail!("Dependency not found: {}", edge);
    }

    output.success(&format!("Removed dependency: {}", edge));
    Ok(())
}

fn list_dependencies(output: &Output, task: Option<TaskId>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let edges: Vec<DependencyEdge> = workspace
        .dependencies()
        .list()?
        .into_iter()
        .filter(|e| task.map_or(true, |t| e.predecessor == t || e.successor == t))
        .collect();

    if output.is_json() {
        output.data(&edges);
    } else if edges.is_empty() {
        println!("No dependencies");
    } else {
        for edge in &edges {
            println!("{}", edge);
        }
    }

    Ok(())
}

/// Prints every task in dependency order (predecessors first)
pub fn order(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let tasks = workspace.tasks().read_all()?;
    let edges = workspace.dependencies().list()?;

    let mut graph = DependencyGraph::from_edges(&edges);
    for id in tasks.keys() {
        graph.add_task(*id);
    }

    let order = graph
        .topological_order()
        .ok_or_else(|| anyhow::anyhow!("Stored dependencies contain a cycle"))?;

    if output.is_json() {
        output.data(&order);
        return Ok(());
    }

    if order.is_empty() {
        println!("No tasks");
        return Ok(());
    }

    for (position, id) in order.iter().enumerate() {
        let title = tasks.get(id).map_or("(missing task)", |t| t.title.as_str());
        let after = graph.predecessors(id);
        if after.is_empty() {
            println!("{:>3}. {} {}", position + 1, id, title);
        } else {
            let after: Vec<String> = after.iter().map(|p| p.to_string()).collect();
            println!("{:>3}. {} {} (after {})", position + 1, id, title, after.join(", "));
        }
    }

    Ok(())
}
