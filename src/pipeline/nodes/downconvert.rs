//! DownConvertNode: local-oscillator demodulation.
//!
//! Each configured channel is mixed with cosine and sine references at its
//! demodulation frequency and replaced by `<name>_I` / `<name>_Q`. Channels
//! configured with no frequency (or zero) pass through untouched.
//!
//! The reference pair of every channel is cached and only regenerated when
//! the sample count, sample rate or frequency of that channel changes.

use crate::pipeline::backend::Backend;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node_type::NodeType;
use crate::pipeline::packet::{Channel, DataPacket};
use ndarray::{Array1, ArrayD, Axis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

/// Coherent demodulation scaling of the reference amplitude.
pub const REFERENCE_AMPLITUDE: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownConvertConfig {
    /// Demodulation frequency in hertz per channel. `None` or 0 passes through.
    pub frequencies: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Backend::is_default")]
    pub backend: Backend,
}

impl DownConvertConfig {
    pub fn new(frequencies: Vec<Option<f64>>) -> Self {
        Self {
            frequencies,
            backend: Backend::default(),
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if let Some(f) = self.frequencies.iter().flatten().find(|f| !f.is_finite()) {
            return Err(PipelineError::invalid(
                NodeType::DownConvert.display_name(),
                format!("demodulation frequency {} is not finite", f),
            ));
        }
        Ok(())
    }
}

/// Reference waveforms for one channel, keyed by what they were generated from.
#[derive(Debug, Clone)]
pub struct ReferenceCache {
    pub sample_count: usize,
    pub sample_rate: f64,
    pub frequency: f64,
    pub cos_ref: Arc<Array1<f64>>,
    pub sin_ref: Arc<Array1<f64>>,
}

impl ReferenceCache {
    fn generate(sample_count: usize, sample_rate: f64, frequency: f64) -> Self {
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_ref = Array1::from_shape_fn(sample_count, |n| {
            REFERENCE_AMPLITUDE * (omega * n as f64).cos()
        });
        let sin_ref = Array1::from_shape_fn(sample_count, |n| {
            REFERENCE_AMPLITUDE * (omega * n as f64).sin()
        });
        Self {
            sample_count,
            sample_rate,
            frequency,
            cos_ref: Arc::new(cos_ref),
            sin_ref: Arc::new(sin_ref),
        }
    }

    fn matches(&self, sample_count: usize, sample_rate: f64, frequency: f64) -> bool {
        self.sample_count == sample_count
            && self.sample_rate == sample_rate
            && self.frequency == frequency
    }
}

/// Multiply every lane along `axis` by `reference`.
fn mix(values: &ArrayD<f64>, axis: Axis, reference: &Array1<f64>) -> ArrayD<f64> {
    let mut out = values.clone();
    for mut lane in out.lanes_mut(axis) {
        lane.zip_mut_with(reference, |x, &r| *x *= r);
    }
    out
}

pub struct DownConvertNode {
    config: DownConvertConfig,
    cache: Vec<Option<ReferenceCache>>,
}

impl DownConvertNode {
    pub fn new(config: DownConvertConfig) -> Self {
        Self {
            config,
            cache: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        NodeType::DownConvert.display_name()
    }

    pub fn config(&self) -> &DownConvertConfig {
        &self.config
    }

    /// Cached references of channel `index`, if that channel was demodulated.
    pub fn cached_reference(&self, index: usize) -> Option<&ReferenceCache> {
        self.cache.get(index).and_then(Option::as_ref)
    }

    fn reference(
        &mut self,
        index: usize,
        sample_count: usize,
        sample_rate: f64,
        frequency: f64,
    ) -> (Arc<Array1<f64>>, Arc<Array1<f64>>) {
        let fresh = matches!(
            &self.cache[index],
            Some(entry) if entry.matches(sample_count, sample_rate, frequency)
        );
        if fresh {
            tracing::trace!("Reusing reference waveforms for channel {}", index);
        } else {
            tracing::trace!(
                "Generating reference waveforms for channel {} (n={}, fs={}, f={})",
                index,
                sample_count,
                sample_rate,
                frequency
            );
            self.cache[index] = None;
        }

        let entry = self.cache[index]
            .get_or_insert_with(|| ReferenceCache::generate(sample_count, sample_rate, frequency));
        (Arc::clone(&entry.cos_ref), Arc::clone(&entry.sin_ref))
    }

    pub fn process(&mut self, packet: DataPacket, _end_stage: bool) -> PipelineResult<DataPacket> {
        let mut packet = packet.for_backend(self.config.backend);
        let channels = packet.len();

        if self.config.frequencies.len() < channels {
            return Err(PipelineError::ChannelConfigMismatch {
                node: self.name().to_string(),
                configured: self.config.frequencies.len(),
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

        if self.cache.len() < channels {
            self.cache.resize_with(channels, || None);
        }

        let mut data = Vec::with_capacity(channels * 2);
        let mut out_rates = Vec::with_capacity(channels * 2);

        for (index, (channel, rate)) in std::mem::take(&mut packet.data)
            .into_iter()
            .zip(rates)
            .enumerate()
        {
            let frequency = match self.config.frequencies[index] {
                Some(f) if f != 0.0 => f,
                _ => {
                    data.push(channel);
                    out_rates.push(rate);
                    continue;
                }
            };
            if rate.is_nan() || rate <= 0.0 {
                return Err(PipelineError::invalid(
                    self.name(),
                    format!("channel '{}' has sample rate {}", channel.name, rate),
                ));
            }

            let sample_count = channel.values.shape()[sample_axis];
            let (cos_ref, sin_ref) = self.reference(index, sample_count, rate, frequency);

            let axis = Axis(sample_axis);
            let in_phase = mix(&channel.values, axis, &cos_ref);
            let quadrature = mix(&channel.values, axis, &sin_ref);

            data.push(Channel::new(format!("{}_I", channel.name), in_phase));
            data.push(Channel::new(format!("{}_Q", channel.name), quadrature));
            out_rates.push(rate);
            out_rates.push(rate);
        }

        packet.data = data;
        packet.misc.sample_rates = Some(out_rates);
        Ok(packet)
    }
}
