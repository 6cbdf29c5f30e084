//! Acquisition data pipeline.
//!
//! Packets flow through an ordered list of nodes. Each node takes the packet
//! by value, transforms it and hands it on:
//!
//! ```text
//! [DownConvert] ──► [FIR] ──► [Decimate] ──► [Mean]
//! ```
//!
//! # Design
//!
//! - **Enum dispatch**: `BuiltinNode` enum for all built-in nodes, plus
//!   `NodePlugin` trait objects for stages defined elsewhere.
//! - **Named axes**: every channel array shares one shape, described by
//!   the packet's `parameters`.
//! - **End stage**: only the last node may reduce the outermost axis.
//! - **Serializable**: a pipeline round-trips through `Vec<NodeConfig>`.

pub mod backend;
pub mod error;
pub mod executor;
pub mod kernels;
pub mod node;
pub mod node_type;
pub mod nodes;
pub mod packet;

pub use backend::{Backend, Locality};
pub use error::{PipelineError, PipelineResult};
pub use executor::{Pipeline, PipelineBuilder};
pub use kernels::{KernelPair, KernelPrecompute, KernelPrecomputeConfig, KernelSet};
pub use node::{AnyNode, BuiltinNode, NodePlugin};
pub use node_type::{NodeConfig, NodeType};
pub use packet::{Channel, DataPacket, Misc};
