//! Test data builders for creating packets

use acqproc_rs::pipeline::DataPacket;
use ndarray::{Array, ArrayD, IxDyn};

/// Builder for raw acquisition packets shaped `(repetition, segment, sample)`
pub struct PacketBuilder {
    repetitions: usize,
    segments: usize,
    samples: usize,
    sample_rate: f64,
    channels: Vec<(String, Box<dyn Fn(usize, usize, usize) -> f64>)>,
}

impl PacketBuilder {
    pub fn new(repetitions: usize, segments: usize, samples: usize) -> Self {
        Self {
            repetitions,
            segments,
            samples,
            sample_rate: 1.0e3,
            channels: Vec::new(),
        }
    }

    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Channel whose value at `(repetition, segment, sample)` is `f(r, s, n)`
    pub fn channel(
        mut self,
        name: &str,
        f: impl Fn(usize, usize, usize) -> f64 + 'static,
    ) -> Self {
        self.channels.push((name.to_string(), Box::new(f)));
        self
    }

    /// Channel holding a cosine at `frequency` hertz along the sample axis
    pub fn tone(self, name: &str, frequency: f64, amplitude: f64) -> Self {
        let rate = self.sample_rate;
        self.channel(name, move |_, _, n| {
            amplitude * (2.0 * std::f64::consts::PI * frequency * n as f64 / rate).cos()
        })
    }

    pub fn build(self) -> DataPacket {
        let shape = [self.repetitions, self.segments, self.samples];
        let mut packet = DataPacket::new(["repetition", "segment", "sample"]);
        for (name, f) in &self.channels {
            let values: ArrayD<f64> =
                Array::from_shape_fn(IxDyn(&shape), |idx| f(idx[0], idx[1], idx[2]));
            packet.push_channel(name.as_str(), values, self.sample_rate);
        }
        packet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_builder() {
        let packet = PacketBuilder::new(2, 3, 4)
            .sample_rate(50.0)
            .channel("ch1", |r, s, n| (r * 100 + s * 10 + n) as f64)
            .build();

        assert_eq!(packet.shape(), Some(&[2usize, 3, 4][..]));
        assert_eq!(packet.misc.sample_rates, Some(vec![50.0]));
        assert_eq!(packet.data[0].values[[1, 2, 3]], 123.0);
        assert!(packet.validate().is_ok());
    }
}
