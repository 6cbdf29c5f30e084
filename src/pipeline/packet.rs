//! The data packet flowing through the pipeline.
//!
//! A `DataPacket` owns one n-dimensional array per channel. All arrays share
//! one shape whose axes are named, outermost first, by `parameters`. Nodes
//! take the packet by value and hand back the transformed packet, so each
//! stage boundary is a point where the invariants can be checked with
//! [`DataPacket::validate`].

use crate::pipeline::backend::Locality;
use crate::pipeline::error::{PipelineError, PipelineResult};
use ndarray::{Array1, ArrayD};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A named channel and its samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub values: ArrayD<f64>,
}

impl Channel {
    pub fn new(name: impl Into<String>, values: ArrayD<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Side-channel metadata that is not shaped like the channel data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Misc {
    /// Sampling rate in hertz of each channel, parallel to `DataPacket::data`.
    #[serde(
        rename = "SampleRates",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sample_rates: Option<Vec<f64>>,

    /// Anything else the acquisition side attached. Passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Structured value exchanged between pipeline nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPacket {
    /// Axis names, outermost (slowest varying) first.
    pub parameters: Vec<String>,
    /// Channels in order. Names are unique.
    pub data: Vec<Channel>,
    #[serde(default)]
    pub misc: Misc,
    /// Coordinates of axes whose values are not a plain integer range.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameter_values: BTreeMap<String, Array1<f64>>,
    /// Where the channel arrays currently live.
    #[serde(default)]
    pub locality: Locality,
}

impl DataPacket {
    /// Create an empty host-resident packet with the given axis names.
    pub fn new<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            data: Vec::new(),
            misc: Misc::default(),
            parameter_values: BTreeMap::new(),
            locality: Locality::Host,
        }
    }

    /// Builder form of [`push_channel`](Self::push_channel).
    pub fn with_channel(
        mut self,
        name: impl Into<String>,
        values: ArrayD<f64>,
        sample_rate: f64,
    ) -> Self {
        self.push_channel(name, values, sample_rate);
        self
    }

    /// Append a channel together with its sample rate.
    pub fn push_channel(&mut self, name: impl Into<String>, values: ArrayD<f64>, sample_rate: f64) {
        self.data.push(Channel::new(name, values));
        self.misc
            .sample_rates
            .get_or_insert_with(Vec::new)
            .push(sample_rate);
    }

    /// Number of channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.data.iter().find(|c| c.name == name)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|c| c.name.as_str())
    }

    /// Shared shape of the channel arrays, if any channel is present.
    pub fn shape(&self) -> Option<&[usize]> {
        self.data.first().map(|c| c.values.shape())
    }

    /// Position of `parameter` in the axis list.
    pub fn axis_of(&self, node: &str, parameter: &str) -> PipelineResult<usize> {
        self.parameters
            .iter()
            .position(|p| p == parameter)
            .ok_or_else(|| PipelineError::MissingParameter {
                node: node.to_string(),
                parameter: parameter.to_string(),
            })
    }

    /// Sample rates, failing if the packet carries none.
    pub fn sample_rates(&self, node: &str) -> PipelineResult<&[f64]> {
        self.misc
            .sample_rates
            .as_deref()
            .ok_or_else(|| PipelineError::MissingSampleRates {
                node: node.to_string(),
            })
    }

    /// Check the shape, rank and metadata invariants.
    pub fn validate(&self) -> PipelineResult<()> {
        let mut axes = HashSet::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            if !axes.insert(parameter.as_str()) {
                return Err(PipelineError::DuplicateParameter(parameter.clone()));
            }
        }

        let mut seen = HashSet::with_capacity(self.data.len());
        for channel in &self.data {
            if !seen.insert(channel.name.as_str()) {
                return Err(PipelineError::DuplicateChannel(channel.name.clone()));
            }
        }

        if let Some(first) = self.data.first() {
            let expected = first.values.shape();
            for channel in &self.data {
                if channel.values.ndim() != self.parameters.len() {
                    return Err(PipelineError::RankMismatch {
                        channel: channel.name.clone(),
                        rank: channel.values.ndim(),
                        parameters: self.parameters.len(),
                    });
                }
                if channel.values.shape() != expected {
                    return Err(PipelineError::ShapeMismatch {
                        channel: channel.name.clone(),
                        expected: expected.to_vec(),
                        found: channel.values.shape().to_vec(),
                    });
                }
            }

            for (parameter, coords) in &self.parameter_values {
                // Coordinates for axes that were reduced away are stale, not fatal.
                let Some(axis) = self.parameters.iter().position(|p| p == parameter) else {
                    continue;
                };
                if coords.len() != expected[axis] {
                    return Err(PipelineError::ParameterValuesLength {
                        parameter: parameter.clone(),
                        expected: expected[axis],
                        found: coords.len(),
                    });
                }
            }
        }

        if let Some(rates) = &self.misc.sample_rates {
            if rates.len() != self.data.len() {
                return Err(PipelineError::SampleRateCount {
                    rates: rates.len(),
                    channels: self.data.len(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    fn zeros(shape: &[usize]) -> ArrayD<f64> {
        Array::zeros(IxDyn(shape))
    }

    #[test]
    fn test_packet_builder() {
        let pkt = DataPacket::new(["repetition", "sample"])
            .with_channel("ch1", zeros(&[2, 4]), 100.0)
            .with_channel("ch2", zeros(&[2, 4]), 200.0);

        assert_eq!(pkt.len(), 2);
        assert_eq!(pkt.shape(), Some(&[2usize, 4][..]));
        assert_eq!(pkt.misc.sample_rates, Some(vec![100.0, 200.0]));
        assert_eq!(pkt.channel_names().collect::<Vec<_>>(), ["ch1", "ch2"]);
        assert!(pkt.validate().is_ok());
    }

    #[test]
    fn test_axis_of_missing() {
        let pkt = DataPacket::new(["repetition", "sample"]);
        assert_eq!(pkt.axis_of("Max", "sample"), Ok(1));
        assert!(matches!(
            pkt.axis_of("Max", "segment"),
            Err(PipelineError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_validate_shape_mismatch() {
        let pkt = DataPacket::new(["repetition", "sample"])
            .with_channel("a", zeros(&[2, 4]), 1.0)
            .with_channel("b", zeros(&[2, 5]), 1.0);
        assert!(matches!(
            pkt.validate(),
            Err(PipelineError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_rank_mismatch() {
        let pkt = DataPacket::new(["sample"]).with_channel("a", zeros(&[2, 4]), 1.0);
        assert!(matches!(
            pkt.validate(),
            Err(PipelineError::RankMismatch { rank: 2, .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_channel() {
        let pkt = DataPacket::new(["sample"])
            .with_channel("a", zeros(&[4]), 1.0)
            .with_channel("a", zeros(&[4]), 1.0);
        assert_eq!(
            pkt.validate(),
            Err(PipelineError::DuplicateChannel("a".to_string()))
        );
    }

    #[test]
    fn test_validate_duplicate_parameter() {
        let pkt = DataPacket::new(["repetition", "repetition"]).with_channel("a", zeros(&[2, 4]), 1.0);
        assert_eq!(
            pkt.validate(),
            Err(PipelineError::DuplicateParameter("repetition".to_string()))
        );
    }

    #[test]
    fn test_validate_sample_rate_count() {
        let mut pkt = DataPacket::new(["sample"]).with_channel("a", zeros(&[4]), 1.0);
        pkt.misc.sample_rates = Some(vec![1.0, 2.0]);
        assert!(matches!(
            pkt.validate(),
            Err(PipelineError::SampleRateCount { rates: 2, channels: 1 })
        ));
    }

    #[test]
    fn test_validate_parameter_values_length() {
        let mut pkt = DataPacket::new(["sample"]).with_channel("a", zeros(&[4]), 1.0);
        pkt.parameter_values
            .insert("sample".to_string(), Array1::zeros(3));
        assert!(matches!(
            pkt.validate(),
            Err(PipelineError::ParameterValuesLength { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_packet_json_round_trip_keeps_misc() {
        let mut pkt = DataPacket::new(["sample"]).with_channel("a", zeros(&[3]), 10.0);
        pkt.misc
            .extra
            .insert("Operator".to_string(), serde_json::json!("bench"));

        let json = serde_json::to_string(&pkt).unwrap();
        assert!(json.contains("SampleRates"));
        let back: DataPacket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pkt);
    }
}
