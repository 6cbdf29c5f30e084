//! Pipeline-specific error types.
//!
//! Every variant describes a misconfigured pipeline or a packet that breaks
//! the shape invariants. None of them are recoverable: the traversal aborts.

use thiserror::Error;

/// Errors that can occur within the pipeline system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Node {node}: parameter '{parameter}' is not present in the packet")]
    MissingParameter { node: String, parameter: String },

    #[error("Node {node}: {configured} channel configurations for {channels} channels")]
    ChannelConfigMismatch {
        node: String,
        configured: usize,
        channels: usize,
    },

    #[error("Node {node}: cannot reduce outermost axis '{parameter}' before the end stage")]
    AxisZeroReduction { node: String, parameter: String },

    #[error("FFT node expects 1 or 2 channels, got {0}")]
    FftChannelCount(usize),

    #[error("Node {node}: packet carries no SampleRates")]
    MissingSampleRates { node: String },

    #[error("{rates} sample rates for {channels} channels")]
    SampleRateCount { rates: usize, channels: usize },

    #[error("Channel '{channel}' has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        channel: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Channel '{channel}' has rank {rank} but the packet names {parameters} parameters")]
    RankMismatch {
        channel: String,
        rank: usize,
        parameters: usize,
    },

    #[error("Duplicate channel name '{0}'")]
    DuplicateChannel(String),

    #[error("Duplicate parameter name '{0}'")]
    DuplicateParameter(String),

    #[error("Parameter values for '{parameter}' have length {found}, axis has length {expected}")]
    ParameterValuesLength {
        parameter: String,
        expected: usize,
        found: usize,
    },

    #[error("Node {node}: axis '{parameter}' is empty")]
    EmptyAxis { node: String, parameter: String },

    #[error("Node {node}: {message}")]
    InvalidConfig { node: String, message: String },

    #[error("Node {0} has no serializable description")]
    NotSerializable(String),
}

impl PipelineError {
    pub(crate) fn invalid(node: &str, message: impl Into<String>) -> Self {
        PipelineError::InvalidConfig {
            node: node.to_string(),
            message: message.into(),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
