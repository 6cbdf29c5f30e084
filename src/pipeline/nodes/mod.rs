//! Built-in pipeline node implementations.

pub mod block_mean;
pub mod downconvert;
pub mod fft;
pub mod fir;
pub mod reduce;

pub use block_mean::{BlockMeanConfig, BlockMeanNode};
pub use downconvert::{DownConvertConfig, DownConvertNode, ReferenceCache};
pub use fft::{FftConfig, FftNode, SpectrumOutput};
pub use fir::{FirChannelConfig, FirConfig, FirNode};
pub use reduce::{
    AxisConfig, AxisReduceNode, AxisReduction, DecimateConfig, DecimateNode, MeanVarNode,
};
