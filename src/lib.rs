//! # acqproc-rs: Acquisition Data Processing
//!
//! Post-processing for raw instrument acquisitions. A digitizer hands over
//! a [`DataPacket`](pipeline::DataPacket) of named-axis arrays; a
//! [`Pipeline`](pipeline::Pipeline) of nodes down-converts, filters,
//! transforms and reduces it before the packet goes back to the
//! acquisition loop for storage.
//!
//! ## Architecture
//!
//! - **Pipeline**: ordered nodes, enum dispatch for built-ins, plugins via trait objects
//! - **Analysis**: FFT, FIR design and window functions used by the nodes
//! - **Sweep**: visiting order (plain, snake, random) of multi-dimensional sweeps
//! - **Config**: pipeline description files in JSON or TOML
//!
//! ## Example
//!
//! ```ignore
//! use acqproc_rs::pipeline::{DataPacket, NodeConfig, PipelineBuilder};
//! use acqproc_rs::pipeline::nodes::{AxisConfig, DecimateConfig};
//!
//! let mut pipeline = PipelineBuilder::new()
//!     .node(NodeConfig::Decimate(DecimateConfig::new("sample", 2)))
//!     .node(NodeConfig::Mean(AxisConfig::new("repetition")))
//!     .build()?;
//!
//! let packet: DataPacket = serde_json::from_str(&raw)?;
//! let averaged = pipeline.run(packet)?;
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sweep;

// Re-export commonly used types
pub use config::PipelineFile;
pub use error::{AcqProcError, Result, ResultExt};
pub use pipeline::{DataPacket, NodeConfig, Pipeline, PipelineBuilder, PipelineError};
pub use sweep::{sweep_order, SweepError, SweepOrderKind};
