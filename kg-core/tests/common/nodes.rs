#![allow(dead_code)]

use async_trait::async_trait;
use pipeline_core::node::{Node, NodeContext, NodeError, NodePartial};
use pipeline_core::progress::{Phase, ProgressEvent};
use pipeline_core::state::StateSnapshot;

#[derive(Debug, Clone)]
pub struct SimpleProgressNode {
    pub activity: &'static str,
}

impl SimpleProgressNode {
    pub fn new(activity: &'static str) -> Self {
        Self { activity }
    }
}

#[async_trait]
impl Node for SimpleProgressNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        Ok(NodePartial::new().with_progress(vec![ProgressEvent::new(Phase::Ingestion, self.activity)]))
    }
}

#[derive(Debug, Clone)]
pub struct NoopNode;

#[async_trait]
impl Node for NoopNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: NodeContext,
    ) -> Result<NodePartial, NodeError> {
        Ok(NodePartial::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_progress_node_construction() {
        let _node = SimpleProgressNode::new("fetch");
    }

    #[test]
    fn test_noop_node_construction() {
        let _node = NoopNode;
    }
}
