//! Graph iteration utilities and algorithms.
//!
//! This module provides idiomatic iterators and common graph algorithms
//! for inspecting and analyzing workflow graphs. Inspired by petgraph's
//! visit module patterns.
//!
//! # Iterators
//!
//! - [`NodesIter`]: Iterate over all nodes in the graph
//! - [`EdgesIter`]: Iterate over all edges as (source, target) pairs
//!
//! # Algorithms
//!
//! - [`topological_sort`](crate::graphs::GraphBuilder::topological_sort): Deterministic node ordering
//!
//! # Examples
//!
//! ```
//! use pipeline_core::graphs::GraphBuilder;
//! use pipeline_core::types::PhaseKind;
//!
//! # struct MyNode;
//! # #[async_trait::async_trait]
//! # impl pipeline_core::node::Node for MyNode {
//! #     async fn run(&self, _: pipeline_core::state::StateSnapshot, _: pipeline_core::node::NodeContext) -> Result<pipeline_core::node::NodePartial, pipeline_core::node::NodeError> {
//! #         Ok(pipeline_core::node::NodePartial::default())
//! #     }
//! # }
//!
//! let builder = GraphBuilder::new()
//!     .add_node(PhaseKind::Custom("A".into()), MyNode)
//!     .add_node(PhaseKind::Custom("B".into()), MyNode)
//!     .add_edge(PhaseKind::Start, PhaseKind::Custom("A".into()))
//!     .add_edge(PhaseKind::Custom("A".into()), PhaseKind::Custom("B".into()))
//!     .add_edge(PhaseKind::Custom("B".into()), PhaseKind::End);
//!
//! // Iterate over nodes
//! for node_kind in builder.nodes() {
//!     println!("Node: {:?}", node_kind);
//! }
//!
//! // Iterate over edges
//! for (from, to) in builder.edges() {
//!     println!("Edge: {:?} -> {:?}", from, to);
//! }
//!
//! // Get deterministic topological ordering
//! let sorted = builder.topological_sort();
//! println!("Topological order: {:?}", sorted);
//! ```

use crate::types::PhaseKind;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Iterator over node kinds in a graph.
///
/// Yields each registered custom node kind. Does not include virtual
/// `Start` or `End` nodes as they are not stored in the node registry.
///
/// # Examples
///
/// ```
/// use pipeline_core::graphs::GraphBuilder;
/// use pipeline_core::types::PhaseKind;
///
/// # struct MyNode;
/// # #[async_trait::async_trait]
/// # impl pipeline_core::node::Node for MyNode {
/// #     async fn run(&self, _: pipeline_core::state::StateSnapshot, _: pipeline_core::node::NodeContext) -> Result<pipeline_core::node::NodePartial, pipeline_core::node::NodeError> {
/// #         Ok(pipeline_core::node::NodePartial::default())
/// #     }
/// # }
///
/// let builder = GraphBuilder::new()
/// .add_node(PhaseKind::Custom("A".into()), MyNode)
///     .add_node(PhaseKind::Custom("B".into()), MyNode)
///     .add_edge(PhaseKind::Start, PhaseKind::Custom("A".into()))
///     .add_edge(PhaseKind::Custom("A".into()), PhaseKind::Custom("B".into()))
///     .add_edge(PhaseKind::Custom("B".into()), PhaseKind::End);
///
/// let nodes: Vec<_> = builder.nodes().collect();
/// assert_eq!(nodes.len(), 2);
/// ```
pub struct NodesIter<'a> {
    inner: std::collections::hash_map::Keys<'a, PhaseKind, std::sync::Arc<dyn crate::node::Node>>,
}

impl<'a> NodesIter<'a> {
    pub(super) fn new(
        inner: std::collections::hash_map::Keys<'a, PhaseKind, std::sync::Arc<dyn crate::node::Node>>,
    ) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for NodesIter<'a> {
    type Item = &'a PhaseKind;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> ExactSizeIterator for NodesIter<'a> {}

/// Iterator over edges in a graph as (source, target) pairs.
///
/// Yields each edge in the graph, including edges from/to virtual
/// `Start` and `End` nodes. The iteration order is not guaranteed
/// to be deterministic due to hash map iteration.
///
/// # Examples
///
/// ```
/// use pipeline_core::graphs::GraphBuilder;
/// use pipeline_core::types::PhaseKind;
///
/// # struct MyNode;
/// # #[async_trait::async_trait]
/// # impl pipeline_core::node::Node for MyNode {
/// #     async fn run(&self, _: pipeline_core::state::StateSnapshot, _: pipeline_core::node::NodeContext) -> Result<pipeline_core::node::NodePartial, pipeline_core::node::NodeError> {
/// #         Ok(pipeline_core::node::NodePartial::default())
/// #     }
/// # }
///
/// let builder = GraphBuilder::new()
///     .add_node(PhaseKind::Custom("A".into()), MyNode)
///     .add_edge(PhaseKind::Start, PhaseKind::Custom("A".into()))
///     .add_edge(PhaseKind::Custom("A".into()), PhaseKind::End);
///
/// let edges: Vec<_> = builder.edges().collect();
/// assert_eq!(edges.len(), 2);
/// ```
pub struct EdgesIter<'a> {
    outer: std::collections::hash_map::Iter<'a, PhaseKind, Vec<PhaseKind>>,
    current_from: Option<&'a PhaseKind>,
    current_targets: std::slice::Iter<'a, PhaseKind>,
}

impl<'a> EdgesIter<'a> {
    pub(super) fn new(edges: &'a FxHashMap<PhaseKind, Vec<PhaseKind>>) -> Self {
        let mut outer = edges.iter();
        let (current_from, current_targets) = match outer.next() {
            Some((from, targets)) => (Some(from), targets.iter()),
            None => (None, [].iter()),
        };
        Self {
            outer,
            current_from,
            current_targets,
        }
    }
}

impl<'a> Iterator for EdgesIter<'a> {
    type Item = (&'a PhaseKind, &'a PhaseKind);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(to) = self.current_targets.next() {
                return Some((self.current_from.unwrap(), to));
            }
            match self.outer.next() {
                Some((from, targets)) => {
                    self.current_from = Some(from);
                    self.current_targets = targets.iter();
                }
                None => return None,
            }
        }
    }
}

/// Performs Kahn's algorithm for topological sorting.
///
/// Returns nodes in topological order (dependencies before dependents).
/// Virtual `Start` node is always first, `End` is always last.
/// Ties are broken lexicographically for deterministic ordering.
///
/// # Panics
///
/// This function assumes the graph is acyclic. If called on a graph with
/// cycles, it will return a partial ordering that excludes cycle members.
/// Use [`GraphBuilder::compile`] to validate acyclicity before calling.
pub(super) fn topological_sort(
    edges: &FxHashMap<PhaseKind, Vec<PhaseKind>>,
) -> Vec<PhaseKind> {
    // Build in-degree map and collect all nodes
    let mut in_degree: FxHashMap<PhaseKind, usize> = FxHashMap::default();
    let mut all_nodes: FxHashSet<PhaseKind> = FxHashSet::default();

    // Collect all nodes from edges
    for (from, tos) in edges {
        all_nodes.insert(from.clone());
        in_degree.entry(from.clone()).or_insert(0);
        for to in tos {
            all_nodes.insert(to.clone());
            *in_degree.entry(to.clone()).or_insert(0) += 1;
        }
    }

    // Initialize queue with nodes that have in-degree 0
    // Use a Vec and sort for deterministic ordering
    let mut queue: VecDeque<PhaseKind> = VecDeque::new();
    let mut zero_in_degree: Vec<_> = in_degree
        .iter()
        .filter(|entry| *entry.1 == 0)
        .map(|(node, _)| node.clone())
        .collect();
    
    // Sort for deterministic ordering - Start always first
    zero_in_degree.sort_by(|a, b| {
        match (a, b) {
            (PhaseKind::Start, _) => std::cmp::Ordering::Less,
            (_, PhaseKind::Start) => std::cmp::Ordering::Greater,
            (PhaseKind::End, _) => std::cmp::Ordering::Greater,
            (_, PhaseKind::End) => std::cmp::Ordering::Less,
            (PhaseKind::Custom(a_name), PhaseKind::Custom(b_name)) => a_name.cmp(b_name),
        }
    });
    
    queue.extend(zero_in_degree);

    let mut result: Vec<PhaseKind> = Vec::with_capacity(all_nodes.len());

    while let Some(node) = queue.pop_front() {
        result.push(node.clone());

        if let Some(neighbors) = edges.get(&node) {
            // Collect neighbors that become zero in-degree after removing this node
            let mut new_zero: Vec<PhaseKind> = Vec::new();
            for neighbor in neighbors {
                if let Some(deg) = in_degree.get_mut(neighbor) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        new_zero.push(neighbor.clone());
                    }
                }
            }
            // Sort new zero-degree nodes for determinism
            new_zero.sort_by(|a, b| {
                match (a, b) {
                    (PhaseKind::Start, _) => std::cmp::Ordering::Less,
                    (_, PhaseKind::Start) => std::cmp::Ordering::Greater,
                    (PhaseKind::End, _) => std::cmp::Ordering::Greater,
                    (_, PhaseKind::End) => std::cmp::Ordering::Less,
                    (PhaseKind::Custom(a_name), PhaseKind::Custom(b_name)) => a_name.cmp(b_name),
                }
            });
            queue.extend(new_zero);
        }
    }

    result
}
