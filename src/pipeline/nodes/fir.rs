//! FirNode: per-channel low/high pass filtering along the sample axis.

use crate::analysis::fir::{convolve_same, design_kernel, FilterKind};
use crate::analysis::window::WindowFunction;
use crate::pipeline::backend::Backend;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node_type::NodeType;
use crate::pipeline::packet::DataPacket;
use ndarray::{ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Filter applied to one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirChannelConfig {
    pub kind: FilterKind,
    pub taps: usize,
    /// Cutoff in hertz.
    pub cutoff: f64,
    #[serde(default)]
    pub window: WindowFunction,
}

impl FirChannelConfig {
    pub fn low_pass(taps: usize, cutoff: f64) -> Self {
        Self {
            kind: FilterKind::LowPass,
            taps,
            cutoff,
            window: WindowFunction::default(),
        }
    }

    pub fn high_pass(taps: usize, cutoff: f64) -> Self {
        Self {
            kind: FilterKind::HighPass,
            ..Self::low_pass(taps, cutoff)
        }
    }

    pub fn window(mut self, window: WindowFunction) -> Self {
        self.window = window;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirConfig {
    pub channels: Vec<FirChannelConfig>,
    #[serde(default, skip_serializing_if = "Backend::is_default")]
    pub backend: Backend,
}

impl FirConfig {
    pub fn new(channels: Vec<FirChannelConfig>) -> Self {
        Self {
            channels,
            backend: Backend::default(),
        }
    }

    /// Checks that do not depend on the channel sample rates.
    pub fn validate(&self) -> PipelineResult<()> {
        let node = NodeType::Fir.display_name();
        for (i, ch) in self.channels.iter().enumerate() {
            if ch.taps == 0 {
                return Err(PipelineError::invalid(node, format!("channel {} has no taps", i)));
            }
            if ch.kind == FilterKind::HighPass && ch.taps % 2 == 0 {
                return Err(PipelineError::invalid(
                    node,
                    format!("channel {}: high-pass needs an odd tap count, got {}", i, ch.taps),
                ));
            }
            if ch.window.generate_symmetric(ch.taps).iter().all(|&w| w == 0.0) {
                return Err(PipelineError::invalid(
                    node,
                    format!("channel {}: {} window vanishes at all {} taps", i, ch.window, ch.taps),
                ));
            }
            if ch.cutoff.is_nan() || ch.cutoff <= 0.0 {
                return Err(PipelineError::invalid(
                    node,
                    format!("channel {}: cutoff {} Hz is not positive", i, ch.cutoff),
                ));
            }
        }
        Ok(())
    }
}

pub struct FirNode {
    config: FirConfig,
}

impl FirNode {
    pub fn new(config: FirConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &'static str {
        NodeType::Fir.display_name()
    }

    pub fn config(&self) -> &FirConfig {
        &self.config
    }

    pub fn process(&mut self, packet: DataPacket, _end_stage: bool) -> PipelineResult<DataPacket> {
        let mut packet = packet.for_backend(self.config.backend);
        let channels = packet.len();

        if self.config.channels.len() < channels {
            return Err(PipelineError::ChannelConfigMismatch {
                node: self.name().to_string(),
                configured: self.config.channels.len(),
                channels,
            });
        }
        let rates = packet.sample_rates(self.name())?.to_vec();
        if rates.len() != channels {
            return Err(PipelineError::SampleRateCount {
                rates: rates.len(),
                channels,
            });
        }
        let Some(sample_axis) = packet.parameters.len().checked_sub(1) else {
            return Err(PipelineError::invalid(self.name(), "packet has no sample axis"));
        };

        for ((channel, filter), rate) in packet
            .data
            .iter_mut()
            .zip(&self.config.channels)
            .zip(rates)
        {
            let kernel = design_kernel(
                filter.kind,
                filter.taps,
                filter.cutoff,
                rate / 2.0,
                filter.window,
            )
            .map_err(|e| {
                PipelineError::invalid(self.name(), format!("channel '{}': {}", channel.name, e))
            })?;

            for mut lane in channel.values.lanes_mut(Axis(sample_axis)) {
                let filtered = convolve_same(&lane.to_vec(), &kernel);
                lane.assign(&ArrayView1::from(&filtered[..]));
            }
        }

        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::node_type::NodeConfig;
    use approx::assert_relative_eq;
    use ndarray::{Array, IxDyn};
    use std::f64::consts::PI;

    fn two_tone_packet(fs: f64, n: usize) -> DataPacket {
        let values = Array::from_shape_fn(IxDyn(&[2, n]), |idx| {
            let t = idx[1] as f64 / fs;
            1.0 + (2.0 * PI * 200.0 * t).sin()
        });
        DataPacket::new(["repetition", "sample"]).with_channel("ch1", values, fs)
    }

    #[test]
    fn test_low_pass_keeps_dc_removes_tone() {
        let pkt = two_tone_packet(1000.0, 400);
        let mut node = FirNode::new(FirConfig::new(vec![FirChannelConfig::low_pass(101, 20.0)]));
        let out = node.process(pkt, false).unwrap();

        assert_eq!(out.shape(), Some(&[2usize, 400][..]));
        for k in 100..300 {
            assert_relative_eq!(out.data[0].values[[1, k]], 1.0, epsilon = 0.01);
        }
    }

    #[test]
    fn test_high_pass_removes_dc() {
        let pkt = two_tone_packet(1000.0, 400);
        let mut node = FirNode::new(FirConfig::new(vec![
            FirChannelConfig::high_pass(101, 50.0).window(WindowFunction::Blackman),
        ]));
        let out = node.process(pkt, false).unwrap();

        let mean: f64 = (100..300).map(|k| out.data[0].values[[0, k]]).sum::<f64>() / 200.0;
        assert!(mean.abs() < 0.02, "residual DC {}", mean);
    }

    #[test]
    fn test_cutoff_above_nyquist_rejected() {
        let pkt = two_tone_packet(100.0, 50);
        let mut node = FirNode::new(FirConfig::new(vec![FirChannelConfig::low_pass(11, 80.0)]));
        assert!(matches!(
            node.process(pkt, false),
            Err(PipelineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_short_config_rejected() {
        let pkt = two_tone_packet(100.0, 50);
        let mut node = FirNode::new(FirConfig::new(Vec::new()));
        assert!(matches!(
            node.process(pkt, false),
            Err(PipelineError::ChannelConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_even_high_pass() {
        let config = FirConfig::new(vec![FirChannelConfig::high_pass(10, 5.0)]);
        assert!(config.validate().is_err());
        let config = FirConfig::new(vec![FirChannelConfig::low_pass(10, 5.0)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_two_tap_hann_rejected_before_filtering() {
        let config = FirConfig::new(vec![
            FirChannelConfig::low_pass(2, 10.0).window(WindowFunction::Hann),
        ]);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig { .. })
        ));
        assert!(NodeConfig::Fir(config.clone()).build().is_err());

        // Called directly, the node still refuses rather than writing NaN.
        let values = Array::from_shape_fn(IxDyn(&[1, 8]), |idx| idx[1] as f64);
        let pkt = DataPacket::new(["repetition", "sample"]).with_channel("ramp", values, 100.0);
        assert!(matches!(
            FirNode::new(config).process(pkt, false),
            Err(PipelineError::InvalidConfig { .. })
        ));
    }
}
