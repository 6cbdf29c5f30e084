//! FftNode: complex spectrum along the sample axis.
//!
//! One input channel is taken as a real signal. Two input channels are the
//! real and imaginary parts of one complex signal, picked by
//! `channel_indices`. The output replaces the sample axis with a frequency
//! axis and publishes either `fft_real`/`fft_imag` or a single `esd` channel.

use crate::analysis::fft::{fft_frequencies, fft_innermost};
use crate::pipeline::backend::Backend;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node_type::NodeType;
use crate::pipeline::packet::{Channel, DataPacket};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FREQUENCY_PARAMETER: &str = "fft_frequency";

fn default_channel_indices() -> [usize; 2] {
    [0, 1]
}

fn default_frequency_parameter() -> String {
    DEFAULT_FREQUENCY_PARAMETER.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FftConfig {
    /// Indices of the real and imaginary channels when two are present.
    #[serde(default = "default_channel_indices")]
    pub channel_indices: [usize; 2],
    /// Name given to the frequency axis.
    #[serde(default = "default_frequency_parameter")]
    pub frequency_parameter: String,
    #[serde(default, skip_serializing_if = "Backend::is_default")]
    pub backend: Backend,
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            channel_indices: default_channel_indices(),
            frequency_parameter: default_frequency_parameter(),
            backend: Backend::default(),
        }
    }
}

impl FftConfig {
    pub fn validate(&self, node_type: NodeType) -> PipelineResult<()> {
        let [re, im] = self.channel_indices;
        if re > 1 || im > 1 || re == im {
            return Err(PipelineError::invalid(
                node_type.display_name(),
                format!("channel indices {:?} must be a permutation of [0, 1]", self.channel_indices),
            ));
        }
        if self.frequency_parameter.is_empty() {
            return Err(PipelineError::invalid(
                node_type.display_name(),
                "frequency parameter name is empty",
            ));
        }
        Ok(())
    }
}

/// What the spectral node publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumOutput {
    /// `fft_real` and `fft_imag` channels.
    Complex,
    /// A single `esd` channel holding the squared magnitude.
    Energy,
}

pub struct FftNode {
    config: FftConfig,
    output: SpectrumOutput,
}

impl FftNode {
    pub fn new(config: FftConfig) -> Self {
        Self {
            config,
            output: SpectrumOutput::Complex,
        }
    }

    /// Energy-spectral-density variant.
    pub fn esd(config: FftConfig) -> Self {
        Self {
            config,
            output: SpectrumOutput::Energy,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self.output {
            SpectrumOutput::Complex => NodeType::Fft,
            SpectrumOutput::Energy => NodeType::Esd,
        }
    }

    pub fn name(&self) -> &'static str {
        self.node_type().display_name()
    }

    pub fn config(&self) -> &FftConfig {
        &self.config
    }

    pub fn output(&self) -> SpectrumOutput {
        self.output
    }

    pub fn process(&mut self, packet: DataPacket, _end_stage: bool) -> PipelineResult<DataPacket> {
        let mut packet = packet.for_backend(self.config.backend);

        let (real_idx, imag_idx) = match packet.len() {
            1 => (0, None),
            2 => {
                let [re, im] = self.config.channel_indices;
                if re > 1 || im > 1 || re == im {
                    return Err(PipelineError::invalid(
                        self.name(),
                        format!("channel indices {:?} do not select two channels", [re, im]),
                    ));
                }
                (re, Some(im))
            }
            n => return Err(PipelineError::FftChannelCount(n)),
        };

        let rates = packet.sample_rates(self.name())?;
        let sample_rate = rates[real_idx];
        if let Some(other) = imag_idx.map(|i| rates[i]) {
            if other != sample_rate {
                tracing::warn!(
                    "FFT inputs disagree on sample rate ({} vs {}), using {}",
                    sample_rate,
                    other,
                    sample_rate
                );
            }
        }
        if sample_rate.is_nan() || sample_rate <= 0.0 {
            return Err(PipelineError::invalid(
                self.name(),
                format!("sample rate {} is not positive", sample_rate),
            ));
        }

        let Some(sample_axis) = packet.parameters.len().checked_sub(1) else {
            return Err(PipelineError::invalid(self.name(), "packet has no sample axis"));
        };
        let frequency_parameter = &self.config.frequency_parameter;
        if packet.parameters[..sample_axis].contains(frequency_parameter) {
            return Err(PipelineError::invalid(
                self.name(),
                format!("frequency axis '{}' already names another axis", frequency_parameter),
            ));
        }
        let n = packet.data[real_idx].values.shape()[sample_axis];

        let spectrum = fft_innermost(
            packet.data[real_idx].values.view(),
            imag_idx.map(|i| packet.data[i].values.view()),
        );

        packet.data = match self.output {
            SpectrumOutput::Complex => vec![
                Channel::new("fft_real", spectrum.real),
                Channel::new("fft_imag", spectrum.imag),
            ],
            SpectrumOutput::Energy => vec![Channel::new("esd", spectrum.energy())],
        };
        packet.misc.sample_rates = Some(vec![sample_rate; packet.data.len()]);

        let time_parameter = std::mem::replace(
            &mut packet.parameters[sample_axis],
            self.config.frequency_parameter.clone(),
        );
        packet.parameter_values.remove(&time_parameter);
        packet.parameter_values.insert(
            self.config.frequency_parameter.clone(),
            Array1::from(fft_frequencies(n, 1.0 / sample_rate)),
        );

        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array, IxDyn};
    use std::f64::consts::PI;

    fn tone(n: usize, cycles: f64, phase: f64) -> ndarray::ArrayD<f64> {
        Array::from_shape_fn(IxDyn(&[3, n]), |idx| {
            (2.0 * PI * cycles * idx[1] as f64 / n as f64 + phase).cos()
        })
    }

    #[test]
    fn test_frequency_axis() {
        let pkt = DataPacket::new(["repetition", "sample"]).with_channel("ch1", tone(8, 1.0, 0.0), 8.0);
        let out = FftNode::new(FftConfig::default()).process(pkt, false).unwrap();

        assert_eq!(out.parameters, ["repetition", DEFAULT_FREQUENCY_PARAMETER]);
        assert_eq!(
            out.parameter_values[DEFAULT_FREQUENCY_PARAMETER].to_vec(),
            [0.0, 1.0, 2.0, 3.0, -4.0, -3.0, -2.0, -1.0]
        );
        assert_eq!(out.channel_names().collect::<Vec<_>>(), ["fft_real", "fft_imag"]);
        assert_eq!(out.misc.sample_rates, Some(vec![8.0, 8.0]));
        assert!(out.validate().is_ok());
    }

    #[test]
    fn test_two_channel_complex_input() {
        let n = 16;
        let pkt = DataPacket::new(["repetition", "sample"])
            .with_channel("I", tone(n, 2.0, 0.0), 16.0)
            .with_channel("Q", tone(n, 2.0, -PI / 2.0), 16.0);
        let out = FftNode::esd(FftConfig::default()).process(pkt, false).unwrap();

        assert_eq!(out.channel_names().collect::<Vec<_>>(), ["esd"]);
        let esd = &out.data[0].values;
        assert_relative_eq!(esd[[0, 2]], (n * n) as f64, epsilon = 1e-6);
        assert_relative_eq!(esd[[0, n - 2]], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_swapped_channel_indices() {
        let n = 16;
        let pkt = DataPacket::new(["repetition", "sample"])
            .with_channel("Q", tone(n, 2.0, -PI / 2.0), 16.0)
            .with_channel("I", tone(n, 2.0, 0.0), 16.0);
        let config = FftConfig {
            channel_indices: [1, 0],
            ..Default::default()
        };
        let out = FftNode::esd(config).process(pkt, false).unwrap();
        assert_relative_eq!(out.data[0].values[[1, 2]], (n * n) as f64, epsilon = 1e-6);
    }

    #[test]
    fn test_frequency_axis_name_collision() {
        let pkt = DataPacket::new(["repetition", "sample"]).with_channel("ch1", tone(8, 1.0, 0.0), 8.0);
        let config = FftConfig {
            frequency_parameter: "repetition".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            FftNode::new(config).process(pkt.clone(), false),
            Err(PipelineError::InvalidConfig { .. })
        ));

        // Reusing the sample axis name is allowed; it is the axis being replaced.
        let config = FftConfig {
            frequency_parameter: "sample".to_string(),
            ..Default::default()
        };
        let out = FftNode::new(config).process(pkt, false).unwrap();
        assert_eq!(out.parameters, ["repetition", "sample"]);
        assert!(out.validate().is_ok());
    }

    #[test]
    fn test_channel_count_rejected() {
        let pkt = DataPacket::new(["sample"])
            .with_channel("a", Array::zeros(IxDyn(&[4])), 1.0)
            .with_channel("b", Array::zeros(IxDyn(&[4])), 1.0)
            .with_channel("c", Array::zeros(IxDyn(&[4])), 1.0);
        assert_eq!(
            FftNode::new(FftConfig::default()).process(pkt, false).unwrap_err(),
            PipelineError::FftChannelCount(3)
        );

        let empty = DataPacket::new(["sample"]);
        assert_eq!(
            FftNode::new(FftConfig::default()).process(empty, false).unwrap_err(),
            PipelineError::FftChannelCount(0)
        );
    }

    #[test]
    fn test_validate_indices() {
        let bad = FftConfig {
            channel_indices: [0, 0],
            ..Default::default()
        };
        assert!(bad.validate(NodeType::Fft).is_err());
        assert!(FftConfig::default().validate(NodeType::Fft).is_ok());
    }
}
