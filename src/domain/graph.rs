//! Dependency graph for tasks
//!
//! Built per call from the edge snapshot the caller just read; nothing is
//! kept between calls. Edge direction is predecessor -> successor, meaning
//! "predecessor must happen before successor". Uses petgraph for graph
//! operations.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;
use std::collections::HashMap;
use thiserror::Error;

use super::id::TaskId;
use super::record::DependencyEdge;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Task cannot depend on itself: {0}")]
    SelfReference(TaskId),

    #[error("Adding dependency would create a cycle: {predecessor} -> {successor}")]
    WouldCreateCycle {
        predecessor: TaskId,
        successor: TaskId,
    },

    #[error("Dependency already exists: {predecessor} -> {successor}")]
    DuplicateEdge {
        predecessor: TaskId,
        successor: TaskId,
    },
}

/// A dependency graph over task IDs
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<TaskId, ()>,

    /// Map from TaskId to node index
    node_map: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from an edge snapshot
    ///
    /// The snapshot is taken as-is; duplicate edges collapse into one.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a DependencyEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            let from = graph.add_task(edge.predecessor);
            let to = graph.add_task(edge.successor);
            graph.graph.update_edge(from, to, ());
        }
        graph
    }

    /// Adds a task to the graph, returning its node
    pub fn add_task(&mut self, task_id: TaskId) -> NodeIndex {
        if let Some(idx) = self.node_map.get(&task_id) {
            return *idx;
        }
        let idx = self.graph.add_node(task_id);
        self.node_map.insert(task_id, idx);
        idx
    }

    /// Returns true if the exact edge is already present
    pub fn contains_edge(&self, predecessor: &TaskId, successor: &TaskId) -> bool {
        match (self.node_map.get(predecessor), self.node_map.get(successor)) {
            (Some(from), Some(to)) => self.graph.contains_edge(*from, *to),
            _ => false,
        }
    }

    /// Returns true if adding `predecessor -> successor` would close a cycle
    ///
    /// Self-loops are reported as cycles without searching. Otherwise runs a
    /// breadth-first search from `successor` along existing edges; reaching
    /// `predecessor` means the new edge would close a loop. Each node is
    /// visited at most once.
    pub fn would_create_cycle(&self, predecessor: &TaskId, successor: &TaskId) -> bool {
        if predecessor == successor {
            return true;
        }

        let (Some(&start), Some(&target)) =
            (self.node_map.get(successor), self.node_map.get(predecessor))
        else {
            return false;
        };

        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(node) = bfs.next(&self.graph) {
            if node == target {
                return true;
            }
        }

        false
    }

    /// Validates a proposed edge against the current snapshot
    ///
    /// Checks run in order: self-reference, cycle, duplicate.
    pub fn check_edge(&self, predecessor: &TaskId, successor: &TaskId) -> Result<(), GraphError> {
        if predecessor == successor {
            return Err(GraphError::SelfReference(*predecessor));
        }

        if self.would_create_cycle(predecessor, successor) {
            return Err(GraphError::WouldCreateCycle {
                predecessor: *predecessor,
                successor: *successor,
            });
        }

        if self.contains_edge(predecessor, successor) {
            return Err(GraphError::DuplicateEdge {
                predecessor: *predecessor,
                successor: *successor,
            });
        }

        Ok(())
    }

    /// Returns the direct predecessors of a task, sorted
    pub fn predecessors(&self, task_id: &TaskId) -> Vec<TaskId> {
        self.neighbors(task_id, Direction::Incoming)
    }

    /// Returns the direct successors of a task (tasks that wait on it), sorted
    pub fn successors(&self, task_id: &TaskId) -> Vec<TaskId> {
        self.neighbors(task_id, Direction::Outgoing)
    }

    fn neighbors(&self, task_id: &TaskId, direction: Direction) -> Vec<TaskId> {
        let Some(&idx) = self.node_map.get(task_id) else {
            return vec![];
        };

        let mut ids: Vec<TaskId> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        ids.sort();
        ids
    }

    /// Returns all tasks in topological order (predecessors first)
    ///
    /// Returns `None` if the snapshot already contains a cycle.
    pub fn topological_order(&self) -> Option<Vec<TaskId>> {
        toposort(&self.graph, None).ok().map(|order| {
            order
                .into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).copied())
                .collect()
        })
    }
}

/// Returns true if adding `predecessor -> successor` to `edges` would create a
/// cycle (self-loops included)
pub fn would_create_cycle(edges: &[DependencyEdge], predecessor: &TaskId, successor: &TaskId) -> bool {
    if predecessor == successor {
        return true;
    }
    DependencyGraph::from_edges(edges).would_create_cycle(predecessor, successor)
}
