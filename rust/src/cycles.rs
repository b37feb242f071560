//! Dependency cycle detection.
//!
//! Two traversals over the interned dependency graph, both driven by an
//! explicit work stack:
//! - `CyclePath`: Tarjan's strongly connected components. Every task in a
//!   component of two or more tasks, or with a dependency on itself, is flagged.
//! - `ClosingEdge`: depth-first search that stops at the first edge leading back
//!   onto the search path and flags only the task owning that edge.

use rustc_hash::FxHashSet;
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::interner::{TaskIdInt, TaskIdInterner};
use crate::log_debug;
use crate::models::{Task, TaskId};

/// Which tasks to flag when a cycle is found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Flag only the node whose outgoing edge closes the cycle.
    ClosingEdge,
    /// Flag every task that lies on some dependency cycle.
    #[default]
    CyclePath,
}

impl CyclePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClosingEdge => "closing_edge",
            Self::CyclePath => "cycle_path",
        }
    }
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CyclePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closing_edge" => Ok(Self::ClosingEdge),
            "cycle_path" => Ok(Self::CyclePath),
            other => Err(ConfigError::UnknownCyclePolicy(other.to_string())),
        }
    }
}

/// Interned adjacency list for one batch.
///
/// Ids that only appear as dependencies get an empty edge list, so they act
/// as leaves and are never used as search roots.
struct DependencyGraph<'a> {
    interner: TaskIdInterner<'a>,
    adjacency: Vec<Vec<TaskIdInt>>,
    /// Batch tasks in input order.
    roots: Vec<TaskIdInt>,
}

impl<'a> DependencyGraph<'a> {
    fn build(tasks: &'a [Task]) -> Self {
        let mut interner = TaskIdInterner::with_capacity(tasks.len());
        let roots: Vec<TaskIdInt> = tasks.iter().map(|t| interner.intern(&t.id)).collect();

        let mut adjacency: Vec<Vec<TaskIdInt>> = vec![Vec::new(); interner.len()];
        for (task, &root) in tasks.iter().zip(&roots) {
            // Duplicate ids: the later task's edges replace the earlier ones
            let edges: Vec<TaskIdInt> = task
                .dependencies
                .iter()
                .map(|dep| interner.intern(dep))
                .collect();
            adjacency[root as usize] = edges;
        }
        adjacency.resize(interner.len(), Vec::new());

        Self {
            interner,
            adjacency,
            roots,
        }
    }

    #[inline]
    fn neighbors(&self, node: TaskIdInt) -> &[TaskIdInt] {
        self.adjacency
            .get(node as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn label(&self, node: TaskIdInt) -> String {
        self.interner
            .resolve(node)
            .map_or_else(|| format!("#{node}"), TaskId::to_string)
    }
}

/// Finds tasks involved in circular dependencies.
#[derive(Clone, Debug, Default)]
pub struct CycleDetector {
    policy: CyclePolicy,
    verbosity: u8,
}

impl CycleDetector {
    pub fn new(policy: CyclePolicy) -> Self {
        Self {
            policy,
            verbosity: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Return the ids of all flagged tasks in the batch.
    pub fn detect(&self, tasks: &[Task]) -> FxHashSet<TaskId> {
        let graph = DependencyGraph::build(tasks);
        let flagged = match self.policy {
            CyclePolicy::ClosingEdge => self.closing_edges(&graph),
            CyclePolicy::CyclePath => self.cycle_members(&graph),
        };

        flagged
            .into_iter()
            .filter_map(|node| graph.interner.resolve(node))
            .cloned()
            .collect()
    }

    /// Short-circuiting search. Once an edge closes a cycle, the rest of the
    /// search from that root is abandoned and the nodes still on its path stay
    /// marked, so a later root reaching any of them is flagged too.
    fn closing_edges(&self, graph: &DependencyGraph<'_>) -> FxHashSet<TaskIdInt> {
        let n = graph.interner.len();
        let mut visited = vec![false; n];
        let mut on_path = vec![false; n];
        // (node, index of the next neighbor to explore)
        let mut path: Vec<(TaskIdInt, usize)> = Vec::new();
        let mut flagged: FxHashSet<TaskIdInt> = FxHashSet::default();

        for &root in &graph.roots {
            if visited[root as usize] {
                continue;
            }
            visited[root as usize] = true;
            on_path[root as usize] = true;
            path.push((root, 0));

            while let Some(frame) = path.last_mut() {
                let (node, cursor) = *frame;
                let Some(&next) = graph.neighbors(node).get(cursor) else {
                    on_path[node as usize] = false;
                    path.pop();
                    continue;
                };
                frame.1 += 1;

                if on_path[next as usize] {
                    log_debug!(
                        self.verbosity,
                        "Cycle closed by edge {} -> {}",
                        graph.label(node),
                        graph.label(next)
                    );
                    flagged.insert(node);
                    break;
                }
                if !visited[next as usize] {
                    visited[next as usize] = true;
                    on_path[next as usize] = true;
                    path.push((next, 0));
                }
            }

            // on_path is left as is for the abandoned frames
            path.clear();
        }

        flagged
    }

    /// Iterative Tarjan. A node whose lowlink equals its own discovery
    /// number roots a component, which is popped off the component stack
    /// when that node's frame finishes.
    fn cycle_members(&self, graph: &DependencyGraph<'_>) -> FxHashSet<TaskIdInt> {
        let mut scc = SccState::new(graph.interner.len());
        // (node, index of the next neighbor to explore)
        let mut frames: Vec<(TaskIdInt, usize)> = Vec::new();
        let mut flagged: FxHashSet<TaskIdInt> = FxHashSet::default();

        for &root in &graph.roots {
            if scc.is_discovered(root) {
                continue;
            }
            scc.discover(root);
            frames.push((root, 0));

            while let Some(frame) = frames.last_mut() {
                let (node, cursor) = *frame;
                if let Some(&next) = graph.neighbors(node).get(cursor) {
                    frame.1 += 1;
                    if !scc.is_discovered(next) {
                        scc.discover(next);
                        frames.push((next, 0));
                    } else if scc.on_stack[next as usize] {
                        scc.lower(node, scc.order[next as usize]);
                    }
                    continue;
                }

                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    scc.lower(parent, scc.lowlink[node as usize]);
                }
                let Some(component) = scc.take_component(node) else {
                    continue;
                };
                if component.len() > 1 || graph.neighbors(node).contains(&node) {
                    log_debug!(
                        self.verbosity,
                        "Cycle of {} task(s) through {}",
                        component.len(),
                        graph.label(node)
                    );
                    flagged.extend(component);
                }
            }
        }

        flagged
    }
}

/// Discovery number of a node the search has not reached yet.
const UNVISITED: u32 = u32::MAX;

/// Per-node bookkeeping for Tarjan's algorithm.
struct SccState {
    order: Vec<u32>,
    lowlink: Vec<u32>,
    on_stack: Vec<bool>,
    stack: Vec<TaskIdInt>,
    next_order: u32,
}

impl SccState {
    fn new(n: usize) -> Self {
        Self {
            order: vec![UNVISITED; n],
            lowlink: vec![UNVISITED; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next_order: 0,
        }
    }

    #[inline]
    fn is_discovered(&self, node: TaskIdInt) -> bool {
        self.order[node as usize] != UNVISITED
    }

    fn discover(&mut self, node: TaskIdInt) {
        self.order[node as usize] = self.next_order;
        self.lowlink[node as usize] = self.next_order;
        self.next_order += 1;
        self.on_stack[node as usize] = true;
        self.stack.push(node);
    }

    #[inline]
    fn lower(&mut self, node: TaskIdInt, value: u32) {
        let low = &mut self.lowlink[node as usize];
        *low = (*low).min(value);
    }

    /// Pop the component rooted at `node`, if `node` is a component root.
    fn take_component(&mut self, node: TaskIdInt) -> Option<Vec<TaskIdInt>> {
        if self.lowlink[node as usize] != self.order[node as usize] {
            return None;
        }
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack[member as usize] = false;
            component.push(member);
            if member == node {
                break;
            }
        }
        Some(component)
    }
}

/// Detect circular dependencies with the given policy.
pub fn detect_cycles(tasks: &[Task], policy: CyclePolicy) -> FxHashSet<TaskId> {
    CycleDetector::new(policy).detect(tasks)
}
