//! Numeric backends and array locality.
//!
//! Every compute node runs on a [`Backend`]. Before computing, a node moves
//! the packet to its backend's [`Locality`] with [`DataPacket::to_locality`].
//! Locality is tracked on the packet itself, never inferred from array types.
//!
//! The device backend stages arrays into contiguous row-major buffers, the
//! layout a device transfer requires. Kernels then run on those buffers in
//! host memory; results are identical to the CPU backend.

use crate::pipeline::packet::DataPacket;
use serde::{Deserialize, Serialize};

/// Where a packet's arrays live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locality {
    #[default]
    Host,
    Device,
}

/// Numeric backend a node computes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Cpu,
    Device,
}

impl Backend {
    /// Locality a packet must have before this backend can compute on it.
    pub fn locality(&self) -> Locality {
        match self {
            Backend::Cpu => Locality::Host,
            Backend::Device => Locality::Device,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Backend::Cpu
    }
}

impl DataPacket {
    /// Move every channel array to `target`. A no-op if already there.
    pub fn to_locality(mut self, target: Locality) -> Self {
        if self.locality == target {
            return self;
        }

        tracing::debug!(
            "Moving {} channels from {:?} to {:?}",
            self.data.len(),
            self.locality,
            target
        );

        for channel in &mut self.data {
            if !channel.values.is_standard_layout() {
                channel.values = channel.values.as_standard_layout().into_owned();
            }
        }
        self.locality = target;
        self
    }

    /// Convert the packet for `backend`, returning it ready for computation.
    pub fn for_backend(self, backend: Backend) -> Self {
        self.to_locality(backend.locality())
    }
}
