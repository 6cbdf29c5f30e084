//! Pipeline executor: applies nodes in series to one packet.
//!
//! A traversal:
//! 1. Validate the incoming packet.
//! 2. Run each node in order, passing `end_stage = true` only to the last.
//! 3. Validate the packet leaving every node.
//!
//! Traversals are synchronous and run to completion. The first error aborts
//! the traversal; there is no partial result.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node::{AnyNode, BuiltinNode, NodePlugin};
use crate::pipeline::node_type::NodeConfig;
use crate::pipeline::packet::DataPacket;

/// An ordered sequence of processing nodes.
#[derive(Default)]
pub struct Pipeline {
    nodes: Vec<AnyNode>,
    /// Number of completed traversals.
    runs: u64,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a pipeline from its descriptions, in order.
    pub fn from_configs(configs: &[NodeConfig]) -> PipelineResult<Self> {
        let mut pipeline = Self::new();
        for config in configs {
            pipeline.add_node(config.build()?);
        }
        Ok(pipeline)
    }

    /// Descriptions of every node, in order.
    ///
    /// Fails if the pipeline holds a plugin node, which has no description.
    pub fn to_configs(&self) -> PipelineResult<Vec<NodeConfig>> {
        self.nodes
            .iter()
            .map(|node| {
                node.config()
                    .ok_or_else(|| PipelineError::NotSerializable(node.name().to_string()))
            })
            .collect()
    }

    /// Append a node. Returns its position.
    pub fn add_node(&mut self, node: impl Into<AnyNode>) -> usize {
        self.nodes.push(node.into());
        self.nodes.len() - 1
    }

    /// Append a user-defined node.
    pub fn add_plugin(&mut self, node: impl NodePlugin + 'static) -> usize {
        self.add_node(AnyNode::Plugin(Box::new(node)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(AnyNode::name).collect()
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Push one packet through every node.
    pub fn run(&mut self, packet: DataPacket) -> PipelineResult<DataPacket> {
        packet.validate()?;

        let last = self.nodes.len().saturating_sub(1);
        let mut packet = packet;
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let end_stage = index == last;
            tracing::debug!(
                "Running node {} '{}' on {} channels (end_stage={})",
                index,
                node.name(),
                packet.len(),
                end_stage
            );

            packet = node.process(packet, end_stage).inspect_err(|e| {
                tracing::error!("Node {} '{}' failed: {}", index, node.name(), e);
            })?;
            packet.validate()?;
        }

        self.runs += 1;
        Ok(packet)
    }
}

/// Builder for constructing a pipeline from node descriptions.
#[derive(Default)]
pub struct PipelineBuilder {
    configs: Vec<NodeConfig>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, config: NodeConfig) -> Self {
        self.configs.push(config);
        self
    }

    pub fn nodes(mut self, configs: impl IntoIterator<Item = NodeConfig>) -> Self {
        self.configs.extend(configs);
        self
    }

    pub fn build(self) -> PipelineResult<Pipeline> {
        let pipeline = Pipeline::from_configs(&self.configs)?;
        tracing::info!("Pipeline built: {:?}", pipeline.node_names());
        Ok(pipeline)
    }
}

impl From<BuiltinNode> for Pipeline {
    fn from(node: BuiltinNode) -> Self {
        let mut pipeline = Pipeline::new();
        pipeline.add_node(node);
        pipeline
    }
}
