//! Node abstraction for the pipeline.
//!
//! Two-layer design:
//! - **`NodePlugin` trait**: for stages defined outside this crate.
//! - **`BuiltinNode` enum**: for all built-in nodes, dispatched by match.
//!   Built-in nodes also describe themselves as a [`NodeConfig`].
//!
//! `AnyNode` wraps either variant so the pipeline can handle both uniformly.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::node_type::{NodeConfig, NodeType};
use crate::pipeline::nodes::{
    AxisReduceNode, AxisReduction, BlockMeanNode, DecimateNode, DownConvertNode, FftNode, FirNode,
    MeanVarNode,
};
use crate::pipeline::packet::DataPacket;

/// Trait for pluggable/user-defined nodes.
///
/// `end_stage` is true only for the last node of a traversal. Nodes that
/// reduce an axis must refuse the outermost axis unless it is set.
#[cfg_attr(test, mockall::automock)]
pub trait NodePlugin: Send {
    /// Human-readable name of this node.
    fn name(&self) -> &'static str;

    /// Transform the packet.
    fn process(&mut self, packet: DataPacket, end_stage: bool) -> PipelineResult<DataPacket>;
}

/// Enum dispatch for built-in nodes.
pub enum BuiltinNode {
    DownConvert(DownConvertNode),
    Fir(FirNode),
    Fft(FftNode),
    Reduce(AxisReduceNode),
    MeanVar(MeanVarNode),
    Decimate(DecimateNode),
    BlockMean(BlockMeanNode),
}

impl BuiltinNode {
    pub fn name(&self) -> &'static str {
        self.node_type().display_name()
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            BuiltinNode::DownConvert(_) => NodeType::DownConvert,
            BuiltinNode::Fir(_) => NodeType::Fir,
            BuiltinNode::Fft(n) => n.node_type(),
            BuiltinNode::Reduce(n) => n.op().node_type(),
            BuiltinNode::MeanVar(_) => NodeType::MeanVar,
            BuiltinNode::Decimate(_) => NodeType::Decimate,
            BuiltinNode::BlockMean(_) => NodeType::BlockMean,
        }
    }

    pub fn process(&mut self, packet: DataPacket, end_stage: bool) -> PipelineResult<DataPacket> {
        match self {
            BuiltinNode::DownConvert(n) => n.process(packet, end_stage),
            BuiltinNode::Fir(n) => n.process(packet, end_stage),
            BuiltinNode::Fft(n) => n.process(packet, end_stage),
            BuiltinNode::Reduce(n) => n.process(packet, end_stage),
            BuiltinNode::MeanVar(n) => n.process(packet, end_stage),
            BuiltinNode::Decimate(n) => n.process(packet, end_stage),
            BuiltinNode::BlockMean(n) => n.process(packet, end_stage),
        }
    }

    /// Description sufficient to rebuild this node.
    pub fn config(&self) -> NodeConfig {
        match self {
            BuiltinNode::DownConvert(n) => NodeConfig::DownConvert(n.config().clone()),
            BuiltinNode::Fir(n) => NodeConfig::Fir(n.config().clone()),
            BuiltinNode::Fft(n) => match n.node_type() {
                NodeType::Esd => NodeConfig::Esd(n.config().clone()),
                _ => NodeConfig::Fft(n.config().clone()),
            },
            BuiltinNode::Reduce(n) => {
                let c = n.config().clone();
                match n.op() {
                    AxisReduction::Max => NodeConfig::Max(c),
                    AxisReduction::Mean => NodeConfig::Mean(c),
                    AxisReduction::Integrate => NodeConfig::Integrate(c),
                }
            }
            BuiltinNode::MeanVar(n) => NodeConfig::MeanVar(n.config().clone()),
            BuiltinNode::Decimate(n) => NodeConfig::Decimate(n.config().clone()),
            BuiltinNode::BlockMean(n) => NodeConfig::BlockMean(n.config().clone()),
        }
    }
}

/// Wrapper that holds either a built-in node (enum dispatch) or a plugin (trait object).
pub enum AnyNode {
    Builtin(BuiltinNode),
    Plugin(Box<dyn NodePlugin>),
}

impl AnyNode {
    pub fn name(&self) -> &'static str {
        match self {
            AnyNode::Builtin(n) => n.name(),
            AnyNode::Plugin(n) => n.name(),
        }
    }

    pub fn process(&mut self, packet: DataPacket, end_stage: bool) -> PipelineResult<DataPacket> {
        match self {
            AnyNode::Builtin(n) => n.process(packet, end_stage),
            AnyNode::Plugin(n) => n.process(packet, end_stage),
        }
    }

    /// Description of a built-in node. Plugins have none.
    pub fn config(&self) -> Option<NodeConfig> {
        match self {
            AnyNode::Builtin(n) => Some(n.config()),
            AnyNode::Plugin(_) => None,
        }
    }
}

impl From<BuiltinNode> for AnyNode {
    fn from(node: BuiltinNode) -> Self {
        AnyNode::Builtin(node)
    }
}

impl From<Box<dyn NodePlugin>> for AnyNode {
    fn from(node: Box<dyn NodePlugin>) -> Self {
        AnyNode::Plugin(node)
    }
}
