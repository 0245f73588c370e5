//! Graph definition and compilation for workflow execution.
//!
//! This module provides the core graph building functionality for creating
//! workflow graphs with nodes, edges, and conditional routing. The main
//! entry point is [`GraphBuilder`], which uses a builder pattern to
//! construct workflows that compile into executable [`App`](crate::app::App) instances.
//!
//! # Core Concepts
//!
//! - **Nodes**: Executable units of work implementing the [`Node`](crate::node::Node) trait
//! - **Edges**: Connections between nodes defining execution flow
//! - **Conditional Edges**: Dynamic routing based on state predicates
//! - **Virtual Endpoints**: `PhaseKind::Start` and `PhaseKind::End` for structural definition
//! - **Compilation**: Validation and conversion to executable [`App`](crate::app::App)
//!
//! # Graph Iteration
//!
//! The module provides petgraph-style iterators for inspecting graph structure:
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
//! // Iterate over registered nodes
//! for node in builder.nodes() {
//!     println!("Node: {:?}", node);
//! }
//!
//! // Iterate over edges as (from, to) pairs
//! for (from, to) in builder.edges() {
//!     println!("Edge: {:?} -> {:?}", from, to);
//! }
//!
//! // Get deterministic topological ordering
//! let sorted = builder.topological_sort();
//! ```
//!
//! # Quick Start
//!
//! ```
//! use pipeline_core::graphs::GraphBuilder;
//! use pipeline_core::types::PhaseKind;
//! use pipeline_core::node::{Node, NodeContext, NodePartial, NodeError};
//! use pipeline_core::state::StateSnapshot;
//! use async_trait::async_trait;
//!
//! // Define a simple node
//! struct MyNode;
//!
//! #[async_trait]
//! impl Node for MyNode {
//!     async fn run(&self, _: StateSnapshot, _: NodeContext) -> Result<NodePartial, NodeError> {
//!         Ok(NodePartial::default())
//!     }
//! }
//!
//! // Build a simple workflow (virtual Start/End):
//! // Start (virtual) -> process -> End (virtual)
//! let app = GraphBuilder::new()
//!     .add_node(PhaseKind::Custom("process".into()), MyNode)
//!     .add_edge(PhaseKind::Start, PhaseKind::Custom("process".into()))
//!     .add_edge(PhaseKind::Custom("process".into()), PhaseKind::End)
//!     .compile();
//! ```
//!
//! # Advanced Usage
//!
//! ## Conditional Routing
//!
//! ```
//! use pipeline_core::graphs::{GraphBuilder, EdgePredicate};
//! use pipeline_core::types::PhaseKind;
//! use std::sync::Arc;
//!
//! // Create a predicate that routes based on progress event count
//! let route_by_messages: EdgePredicate = Arc::new(|snapshot| {
//!     if snapshot.progress.len() > 5 {
//!         vec!["process".to_string()]
//!     } else {
//!         vec!["skip".to_string()]
//!     }
//! });
//!
//! # struct MyNode;
//! # #[async_trait::async_trait]
//! # impl pipeline_core::node::Node for MyNode {
//! #     async fn run(&self, _: pipeline_core::state::StateSnapshot, _: pipeline_core::node::NodeContext) -> Result<pipeline_core::node::NodePartial, pipeline_core::node::NodeError> {
//! #         Ok(pipeline_core::node::NodePartial::default())
//! #     }
//! # }
//!
//! let app = GraphBuilder::new()
//!     .add_node(PhaseKind::Custom("process".into()), MyNode)
//!     .add_node(PhaseKind::Custom("skip".into()), MyNode)
//!     // Basic structural edge from virtual Start
//!     .add_edge(PhaseKind::Start, PhaseKind::Custom("process".into()))
//!     .add_conditional_edge(PhaseKind::Start, route_by_messages)
//!     .add_edge(PhaseKind::Custom("process".into()), PhaseKind::End)
//!     .add_edge(PhaseKind::Custom("skip".into()), PhaseKind::End)
//!     .compile();
//! ```
//!
//! ## petgraph Integration
//!
//! With the `petgraph-compat` feature, you can convert graphs to petgraph format
//! for advanced algorithms and DOT visualization:
//!
//! ```ignore
//! // Enable with: pipeline-core = { features = ["petgraph-compat"] }
//! use pipeline_core::graphs::GraphBuilder;
//!
//! let builder = GraphBuilder::new()
//!     .add_node(PhaseKind::Custom("A".into()), MyNode)
//!     .add_edge(PhaseKind::Start, PhaseKind::Custom("A".into()))
//!     .add_edge(PhaseKind::Custom("A".into()), PhaseKind::End);
//!
//! // Convert to petgraph for analysis
//! let pg = builder.to_petgraph();
//! assert!(!petgraph::algo::is_cyclic_directed(&pg.graph));
//!
//! // Export to DOT for visualization
//! let dot = builder.to_dot();
//! std::fs::write("workflow.dot", dot)?;
//! ```

// Internal module declarations
mod builder;
mod compilation;
mod edges;
mod iteration;

#[cfg(feature = "petgraph-compat")]
mod petgraph_compat;

// Public re-exports for backward compatibility
pub use builder::GraphBuilder;
pub use edges::{ConditionalEdge, EdgePredicate};
pub use iteration::{EdgesIter, NodesIter};

#[cfg(feature = "petgraph-compat")]
pub use petgraph_compat::{NodeIndexMap, PetgraphConversion, PhaseDiGraph, is_cyclic};
