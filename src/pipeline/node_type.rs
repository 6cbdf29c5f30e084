//! Node types and their serializable descriptions.
//!
//! A pipeline is persisted as an ordered list of [`NodeConfig`] values, each
//! written as `{ "type": ..., "parameters": { ... } }`. The type tag picks the
//! node variant when the description is loaded back.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::node::BuiltinNode;
use crate::pipeline::nodes::{
    AxisConfig, AxisReduceNode, AxisReduction, BlockMeanConfig, BlockMeanNode, DecimateConfig,
    DecimateNode, DownConvertConfig, DownConvertNode, FftConfig, FftNode, FirConfig, FirNode,
    MeanVarNode,
};
use serde::{Deserialize, Serialize};

/// Types of nodes that can be instantiated from a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    DownConvert,
    Fir,
    Fft,
    Esd,
    Max,
    Mean,
    MeanVar,
    Integrate,
    Decimate,
    BlockMean,
}

impl NodeType {
    /// Get the display name for this node type.
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeType::DownConvert => "DownConvert",
            NodeType::Fir => "FIR",
            NodeType::Fft => "FFT",
            NodeType::Esd => "ESD",
            NodeType::Max => "Max",
            NodeType::Mean => "Mean",
            NodeType::MeanVar => "MeanVar",
            NodeType::Integrate => "Integrate",
            NodeType::Decimate => "Decimate",
            NodeType::BlockMean => "BlockMean",
        }
    }

    /// Get all available node types.
    pub fn all() -> &'static [NodeType] {
        &[
            NodeType::DownConvert,
            NodeType::Fir,
            NodeType::Fft,
            NodeType::Esd,
            NodeType::Max,
            NodeType::Mean,
            NodeType::MeanVar,
            NodeType::Integrate,
            NodeType::Decimate,
            NodeType::BlockMean,
        ]
    }

    /// Whether this node refuses to reduce the outermost axis outside the end stage.
    pub fn guards_outer_axis(&self) -> bool {
        matches!(
            self,
            NodeType::Max
                | NodeType::Mean
                | NodeType::MeanVar
                | NodeType::Integrate
                | NodeType::Decimate
        )
    }

    /// Get a detailed description of what this node does.
    pub fn description(&self) -> &'static str {
        match self {
            NodeType::DownConvert => {
                "Demodulates each channel at its own frequency.\n\
                 Splits a channel into _I and _Q.\n\
                 None or 0 passes the channel through."
            }
            NodeType::Fir => {
                "Low/high pass FIR filter per channel.\n\
                 Windowed-sinc kernel, same-length output."
            }
            NodeType::Fft => {
                "Complex FFT along the sample axis.\n\
                 Publishes fft_real and fft_imag."
            }
            NodeType::Esd => {
                "Energy spectral density along the sample axis.\n\
                 Publishes a single esd channel."
            }
            NodeType::Max => "Maximum over one axis.",
            NodeType::Mean => "Mean over one axis.",
            NodeType::MeanVar => {
                "Mean and variance over one axis.\n\
                 Doubles the channel count."
            }
            NodeType::Integrate => "Sum over one axis.",
            NodeType::Decimate => {
                "Keeps every k-th sample along one axis.\n\
                 Divides sample rates when decimating samples."
            }
            NodeType::BlockMean => {
                "Averages one axis in fixed-size blocks.\n\
                 Keeps the axis, drops the remainder."
            }
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Description of one node: its type tag plus constructor parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "snake_case")]
pub enum NodeConfig {
    DownConvert(DownConvertConfig),
    Fir(FirConfig),
    Fft(FftConfig),
    Esd(FftConfig),
    Max(AxisConfig),
    Mean(AxisConfig),
    MeanVar(AxisConfig),
    Integrate(AxisConfig),
    Decimate(DecimateConfig),
    BlockMean(BlockMeanConfig),
}

impl NodeConfig {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeConfig::DownConvert(_) => NodeType::DownConvert,
            NodeConfig::Fir(_) => NodeType::Fir,
            NodeConfig::Fft(_) => NodeType::Fft,
            NodeConfig::Esd(_) => NodeType::Esd,
            NodeConfig::Max(_) => NodeType::Max,
            NodeConfig::Mean(_) => NodeType::Mean,
            NodeConfig::MeanVar(_) => NodeType::MeanVar,
            NodeConfig::Integrate(_) => NodeType::Integrate,
            NodeConfig::Decimate(_) => NodeType::Decimate,
            NodeConfig::BlockMean(_) => NodeType::BlockMean,
        }
    }

    /// Checks that need no packet.
    pub fn validate(&self) -> PipelineResult<()> {
        match self {
            NodeConfig::DownConvert(c) => c.validate(),
            NodeConfig::Fir(c) => c.validate(),
            NodeConfig::Fft(c) => c.validate(NodeType::Fft),
            NodeConfig::Esd(c) => c.validate(NodeType::Esd),
            NodeConfig::Max(_)
            | NodeConfig::Mean(_)
            | NodeConfig::MeanVar(_)
            | NodeConfig::Integrate(_) => Ok(()),
            NodeConfig::Decimate(c) => c.validate(),
            NodeConfig::BlockMean(c) => c.validate(),
        }
    }

    /// Validate and construct a fresh node.
    pub fn build(&self) -> PipelineResult<BuiltinNode> {
        self.validate()?;
        let node = match self.clone() {
            NodeConfig::DownConvert(c) => BuiltinNode::DownConvert(DownConvertNode::new(c)),
            NodeConfig::Fir(c) => BuiltinNode::Fir(FirNode::new(c)),
            NodeConfig::Fft(c) => BuiltinNode::Fft(FftNode::new(c)),
            NodeConfig::Esd(c) => BuiltinNode::Fft(FftNode::esd(c)),
            NodeConfig::Max(c) => BuiltinNode::Reduce(AxisReduceNode::new(AxisReduction::Max, c)),
            NodeConfig::Mean(c) => {
                BuiltinNode::Reduce(AxisReduceNode::new(AxisReduction::Mean, c))
            }
            NodeConfig::MeanVar(c) => BuiltinNode::MeanVar(MeanVarNode::new(c)),
            NodeConfig::Integrate(c) => {
                BuiltinNode::Reduce(AxisReduceNode::new(AxisReduction::Integrate, c))
            }
            NodeConfig::Decimate(c) => BuiltinNode::Decimate(DecimateNode::new(c)),
            NodeConfig::BlockMean(c) => BuiltinNode::BlockMean(BlockMeanNode::new(c)),
        };
        Ok(node)
    }
}
