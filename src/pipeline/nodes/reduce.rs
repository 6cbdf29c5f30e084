//! Axis-reduction nodes.
//!
//! Each node locates its named axis, reduces every channel along it and then
//! updates the packet's parameter bookkeeping. Reducing the outermost axis is
//! only allowed on the end stage of a traversal.

use crate::pipeline::backend::Backend;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node_type::NodeType;
use crate::pipeline::packet::{Channel, DataPacket};
use ndarray::{Axis, Slice};
use serde::{Deserialize, Serialize};

/// Configuration shared by reductions that only name an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub parameter: String,
    #[serde(default, skip_serializing_if = "Backend::is_default")]
    pub backend: Backend,
}

impl AxisConfig {
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            backend: Backend::default(),
        }
    }
}

/// Locate `parameter`, refusing the outermost axis outside the end stage
/// for node types that guard it.
pub(crate) fn reduction_axis(
    packet: &DataPacket,
    node: NodeType,
    parameter: &str,
    end_stage: bool,
) -> PipelineResult<usize> {
    let axis = packet.axis_of(node.display_name(), parameter)?;
    if axis == 0 && !end_stage && node.guards_outer_axis() {
        return Err(PipelineError::AxisZeroReduction {
            node: node.display_name().to_string(),
            parameter: parameter.to_string(),
        });
    }
    Ok(axis)
}

fn ensure_not_empty(
    packet: &DataPacket,
    node: &str,
    parameter: &str,
    axis: usize,
) -> PipelineResult<()> {
    if packet.shape().is_some_and(|shape| shape[axis] == 0) {
        return Err(PipelineError::EmptyAxis {
            node: node.to_string(),
            parameter: parameter.to_string(),
        });
    }
    Ok(())
}

/// Remove axis `axis` from the parameter list along with its coordinates.
fn drop_axis(packet: &mut DataPacket, axis: usize) {
    let name = packet.parameters.remove(axis);
    packet.parameter_values.remove(&name);
}

/// Single-output reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisReduction {
    Max,
    Mean,
    Integrate,
}

impl AxisReduction {
    pub fn node_type(&self) -> NodeType {
        match self {
            AxisReduction::Max => NodeType::Max,
            AxisReduction::Mean => NodeType::Mean,
            AxisReduction::Integrate => NodeType::Integrate,
        }
    }
}

/// Max, Mean or Integrate over one axis, removing it.
pub struct AxisReduceNode {
    op: AxisReduction,
    config: AxisConfig,
}

impl AxisReduceNode {
    pub fn new(op: AxisReduction, config: AxisConfig) -> Self {
        Self { op, config }
    }

    pub fn op(&self) -> AxisReduction {
        self.op
    }

    pub fn name(&self) -> &'static str {
        self.op.node_type().display_name()
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    pub fn process(&mut self, packet: DataPacket, end_stage: bool) -> PipelineResult<DataPacket> {
        let mut packet = packet.for_backend(self.config.backend);
        let parameter = &self.config.parameter;
        let axis = reduction_axis(&packet, self.op.node_type(), parameter, end_stage)?;
        if self.op != AxisReduction::Integrate {
            ensure_not_empty(&packet, self.name(), parameter, axis)?;
        }

        for channel in &mut packet.data {
            let values = &channel.values;
            channel.values = match self.op {
                AxisReduction::Max => values.fold_axis(Axis(axis), f64::NEG_INFINITY, |&m, &x| {
                    if m.is_nan() || x.is_nan() {
                        f64::NAN
                    } else {
                        m.max(x)
                    }
                }),
                AxisReduction::Mean => values.mean_axis(Axis(axis)).ok_or_else(|| {
                    PipelineError::EmptyAxis {
                        node: NodeType::Mean.display_name().to_string(),
                        parameter: parameter.clone(),
                    }
                })?,
                AxisReduction::Integrate => values.sum_axis(Axis(axis)),
            };
        }

        drop_axis(&mut packet, axis);
        Ok(packet)
    }
}

/// Mean and variance over one axis, doubling the channel count.
pub struct MeanVarNode {
    config: AxisConfig,
}

impl MeanVarNode {
    pub fn new(config: AxisConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &'static str {
        NodeType::MeanVar.display_name()
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    pub fn process(&mut self, packet: DataPacket, end_stage: bool) -> PipelineResult<DataPacket> {
        let mut packet = packet.for_backend(self.config.backend);
        let parameter = &self.config.parameter;
        let axis = reduction_axis(&packet, NodeType::MeanVar, parameter, end_stage)?;
        ensure_not_empty(&packet, self.name(), parameter, axis)?;

        let channels = std::mem::take(&mut packet.data);
        let mut data = Vec::with_capacity(channels.len() * 2);
        for channel in channels {
            let mean = channel.values.mean_axis(Axis(axis)).ok_or_else(|| {
                PipelineError::EmptyAxis {
                    node: self.name().to_string(),
                    parameter: parameter.clone(),
                }
            })?;
            let var = channel.values.var_axis(Axis(axis), 0.0);
            data.push(Channel::new(format!("{}_{}_Mean", channel.name, parameter), mean));
            data.push(Channel::new(format!("{}_{}_Var", channel.name, parameter), var));
        }
        packet.data = data;

        if let Some(rates) = packet.misc.sample_rates.as_mut() {
            *rates = rates.iter().flat_map(|&r| [r, r]).collect();
        }

        drop_axis(&mut packet, axis);
        Ok(packet)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimateConfig {
    pub parameter: String,
    /// Keep every `stride`-th sample.
    pub stride: usize,
    #[serde(default, skip_serializing_if = "Backend::is_default")]
    pub backend: Backend,
}

impl DecimateConfig {
    pub fn new(parameter: impl Into<String>, stride: usize) -> Self {
        Self {
            parameter: parameter.into(),
            stride,
            backend: Backend::default(),
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.stride == 0 {
            return Err(PipelineError::invalid(
                NodeType::Decimate.display_name(),
                "stride must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Keeps every `stride`-th sample along one axis.
///
/// The axis stays in the parameter list with length `ceil(n / stride)`.
/// Decimating the innermost axis divides every sample rate by the stride.
pub struct DecimateNode {
    config: DecimateConfig,
}

impl DecimateNode {
    pub fn new(config: DecimateConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &'static str {
        NodeType::Decimate.display_name()
    }

    pub fn config(&self) -> &DecimateConfig {
        &self.config
    }

    pub fn process(&mut self, packet: DataPacket, end_stage: bool) -> PipelineResult<DataPacket> {
        self.config.validate()?;
        let mut packet = packet.for_backend(self.config.backend);
        let parameter = &self.config.parameter;
        let axis = reduction_axis(&packet, NodeType::Decimate, parameter, end_stage)?;
        let step = Slice::new(0, None, self.config.stride as isize);

        for channel in &mut packet.data {
            channel.values = channel.values.slice_axis(Axis(axis), step).to_owned();
        }
        if let Some(coords) = packet.parameter_values.get_mut(parameter) {
            *coords = coords.slice_axis(Axis(0), step).to_owned();
        }

        if axis + 1 == packet.parameters.len() {
            if let Some(rates) = packet.misc.sample_rates.as_mut() {
                for rate in rates.iter_mut() {
                    *rate /= self.config.stride as f64;
                }
            }
        }

        Ok(packet)
    }
}
