//! Graph compilation logic and validation.
//!
//! This module contains the logic for compiling a GraphBuilder into an
//! executable App, including future validation and error handling.

use crate::app::App;

/// Compilation logic for GraphBuilder.
impl super::builder::GraphBuilder {
    /// Compiles the graph into an executable application.
    ///
    /// Validates the graph configuration and converts it into an [`App`] that
    /// can execute workflows. This method performs several validation checks:
    ///
    /// - Future: cycle detection, reachability analysis
    /// - Future: validation that at least one edge originates from Start
    ///
    /// # Returns
    ///
    /// - `Ok(App)`: Successfully compiled application ready for execution
    ///
    /// # Errors
    ///
    /// Currently none. (Reserved for future structural validation errors.)
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
    /// let app = GraphBuilder::new()
    ///     .add_node(PhaseKind::Custom("process".into()), MyNode)
    ///     .add_edge(PhaseKind::Start, PhaseKind::Custom("process".into()))
    ///     .add_edge(PhaseKind::Custom("process".into()), PhaseKind::End)
    ///     .compile();
    ///
    /// // App is ready for execution
    /// ```
    pub fn compile(self) -> App {
        let (nodes, edges, conditional_edges, runtime_config, _reducer_registry) =
            self.into_parts();
        App::from_parts(nodes, edges, conditional_edges, runtime_config)
    }
}
