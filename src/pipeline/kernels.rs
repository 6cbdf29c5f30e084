//! Multiplier kernels for an embedded hardware multiplier.
//!
//! This is parameter generation, not packet transformation: the hardware
//! applies the kernels to its own sample stream, so nothing here touches a
//! [`DataPacket`](crate::pipeline::DataPacket).

use crate::pipeline::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// Scaling the hardware applies after the multiplier stage.
pub const KERNEL_POST_SCALE: f64 = 1.0;

const NODE_NAME: &str = "KernelPrecompute";

/// In-phase and quadrature kernels for one multiplier sub-channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelPair {
    pub in_phase: Vec<f64>,
    pub quadrature: Vec<f64>,
}

/// Kernels for every physical channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSet {
    /// Outer index: physical channel. Inner index: multiplier sub-channel.
    pub channels: Vec<Vec<KernelPair>>,
    pub post_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelPrecomputeConfig {
    /// Constant multiplier per physical channel and sub-channel.
    pub multipliers: Vec<Vec<f64>>,
}

/// Generates constant multiplier kernels for a requested sample count.
#[derive(Debug, Clone)]
pub struct KernelPrecompute {
    config: KernelPrecomputeConfig,
}

impl KernelPrecompute {
    pub fn new(config: KernelPrecomputeConfig) -> PipelineResult<Self> {
        if let Some(value) = config
            .multipliers
            .iter()
            .flatten()
            .find(|v| !v.is_finite())
        {
            return Err(PipelineError::invalid(
                NODE_NAME,
                format!("multiplier {} is not finite", value),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &KernelPrecomputeConfig {
        &self.config
    }

    pub fn generate(&self, sample_count: usize) -> PipelineResult<KernelSet> {
        if sample_count == 0 {
            return Err(PipelineError::invalid(
                NODE_NAME,
                "kernels need at least one sample",
            ));
        }

        let channels = self
            .config
            .multipliers
            .iter()
            .map(|subs| {
                subs.iter()
                    .map(|&value| KernelPair {
                        in_phase: vec![value; sample_count],
                        quadrature: vec![value; sample_count],
                    })
                    .collect()
            })
            .collect();

        tracing::debug!(
            "Generated multiplier kernels for {} channels, {} samples",
            self.config.multipliers.len(),
            sample_count
        );

        Ok(KernelSet {
            channels,
            post_scale: KERNEL_POST_SCALE,
        })
    }
}
