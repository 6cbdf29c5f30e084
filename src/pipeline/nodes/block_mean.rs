//! BlockMeanNode: averages an axis in fixed-size blocks.
//!
//! Unlike the other reductions the axis is kept; only its length shrinks to
//! the number of blocks. Trailing samples that do not fill a whole block are
//! dropped. A block factor larger than the axis averages the whole axis into
//! a single block.

use crate::pipeline::backend::Backend;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node_type::NodeType;
use crate::pipeline::nodes::reduce::reduction_axis;
use crate::pipeline::packet::DataPacket;
use ndarray::{Array, ArrayBase, Axis, Data, RemoveAxis, Slice};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMeanConfig {
    pub parameter: String,
    pub block_fac: usize,
    #[serde(default, skip_serializing_if = "Backend::is_default")]
    pub backend: Backend,
}

impl BlockMeanConfig {
    pub fn new(parameter: impl Into<String>, block_fac: usize) -> Self {
        Self {
            parameter: parameter.into(),
            block_fac,
            backend: Backend::default(),
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.block_fac == 0 {
            return Err(PipelineError::invalid(
                NodeType::BlockMean.display_name(),
                "block_fac must be at least 1",
            ));
        }
        Ok(())
    }

    /// `(num_blocks, block_len)` for an axis of length `len > 0`.
    pub fn blocks(&self, len: usize) -> (usize, usize) {
        if self.block_fac > len {
            (1, len)
        } else {
            (len / self.block_fac, self.block_fac)
        }
    }
}

fn block_average<S, D>(
    values: &ArrayBase<S, D>,
    axis: Axis,
    num_blocks: usize,
    block_len: usize,
) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: RemoveAxis,
{
    let mut dim = values.raw_dim();
    dim[axis.index()] = num_blocks;
    let mut out = Array::zeros(dim);

    for b in 0..num_blocks {
        let block = values.slice_axis(axis, Slice::from(b * block_len..(b + 1) * block_len));
        if let Some(mean) = block.mean_axis(axis) {
            out.index_axis_mut(axis, b).assign(&mean);
        }
    }
    out
}

pub struct BlockMeanNode {
    config: BlockMeanConfig,
}

impl BlockMeanNode {
    pub fn new(config: BlockMeanConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &'static str {
        NodeType::BlockMean.display_name()
    }

    pub fn config(&self) -> &BlockMeanConfig {
        &self.config
    }

    pub fn process(&mut self, packet: DataPacket, end_stage: bool) -> PipelineResult<DataPacket> {
        self.config.validate()?;
        let mut packet = packet.for_backend(self.config.backend);
        let parameter = &self.config.parameter;
        let axis = reduction_axis(&packet, NodeType::BlockMean, parameter, end_stage)?;

        let Some(len) = packet.shape().map(|shape| shape[axis]) else {
            return Ok(packet);
        };
        if len == 0 {
            return Err(PipelineError::EmptyAxis {
                node: self.name().to_string(),
                parameter: parameter.clone(),
            });
        }
        let (num_blocks, block_len) = self.config.blocks(len);
        tracing::trace!(
            "Averaging '{}' ({} samples) into {} blocks of {}",
            parameter,
            len,
            num_blocks,
            block_len
        );

        for channel in &mut packet.data {
            channel.values = block_average(&channel.values, Axis(axis), num_blocks, block_len);
        }
        if let Some(coords) = packet.parameter_values.get_mut(parameter) {
            *coords = block_average(coords, Axis(0), num_blocks, block_len);
        }

        if axis + 1 == packet.parameters.len() {
            if let Some(rates) = packet.misc.sample_rates.as_mut() {
                for rate in rates.iter_mut() {
                    *rate /= block_len as f64;
                }
            }
        }

        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::IxDyn;

    fn ramp(len: usize) -> DataPacket {
        let values = Array::from_shape_fn(IxDyn(&[2, len]), |idx| (idx[0] * 100 + idx[1]) as f64);
        DataPacket::new(["repetition", "sample"]).with_channel("ch", values, 10.0)
    }

    #[test]
    fn test_remainder_dropped() {
        let mut node = BlockMeanNode::new(BlockMeanConfig::new("sample", 3));
        let out = node.process(ramp(10), false).unwrap();

        assert_eq!(out.parameters, ["repetition", "sample"]);
        assert_eq!(out.shape(), Some(&[2usize, 3][..]));
        let row: Vec<f64> = out.data[0].values.iter().take(3).copied().collect();
        assert_eq!(row, [1.0, 4.0, 7.0]);
        assert_relative_eq!(out.misc.sample_rates.unwrap()[0], 10.0 / 3.0);
    }

    #[test]
    fn test_oversized_block_collapses_axis() {
        let mut node = BlockMeanNode::new(BlockMeanConfig::new("sample", 11));
        let out = node.process(ramp(10), false).unwrap();

        assert_eq!(out.shape(), Some(&[2usize, 1][..]));
        assert_relative_eq!(out.data[0].values[[0, 0]], 4.5);
        assert_relative_eq!(out.data[0].values[[1, 0]], 104.5);
    }

    #[test]
    fn test_outer_axis_allowed_without_end_stage() {
        let mut node = BlockMeanNode::new(BlockMeanConfig::new("repetition", 2));
        let out = node.process(ramp(4), false).unwrap();
        assert_eq!(out.shape(), Some(&[1usize, 4][..]));
        assert_relative_eq!(out.data[0].values[[0, 1]], 51.0);
        assert_eq!(out.misc.sample_rates, Some(vec![10.0]));
    }

    #[test]
    fn test_coordinates_averaged() {
        let mut pkt = ramp(6);
        pkt.parameter_values.insert(
            "sample".to_string(),
            ndarray::Array1::from(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
        );
        let out = BlockMeanNode::new(BlockMeanConfig::new("sample", 2))
            .process(pkt, false)
            .unwrap();
        assert_eq!(out.parameter_values["sample"].to_vec(), [0.5, 2.5, 4.5]);
        assert!(out.validate().is_ok());
    }

    #[test]
    fn test_zero_block_fac_rejected() {
        let mut node = BlockMeanNode::new(BlockMeanConfig::new("sample", 0));
        assert!(matches!(
            node.process(ramp(4), false),
            Err(PipelineError::InvalidConfig { .. })
        ));
    }
}
