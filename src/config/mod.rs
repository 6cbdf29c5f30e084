//! Pipeline description files.
//!
//! A [`PipelineFile`] stores an ordered list of node descriptions plus the
//! sweep ordering of each sweep axis, so the processing chain of an
//! experiment can be persisted next to its metadata and rebuilt later.
//!
//! # Formats
//!
//! The format is picked from the file extension:
//!
//! - `.toml`: TOML
//! - anything else: JSON (pretty-printed on save)
//!
//! # Example
//!
//! ```ignore
//! use acqproc_rs::config::PipelineFile;
//!
//! let file = PipelineFile::load("readout.toml")?;
//! let mut pipeline = file.build_pipeline()?;
//! let order = file.sweep_order(&[11, 21])?;
//! ```

use crate::error::{AcqProcError, Result};
use crate::pipeline::{NodeConfig, Pipeline};
use crate::sweep::{self, SweepOrderKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current pipeline file format version
pub const PIPELINE_FILE_VERSION: u32 = 1;

/// On-disk format of a pipeline file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Pick the format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }
}

/// Persisted processing chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineFile {
    /// File format version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Node descriptions, in execution order
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Ordering of each sweep axis, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sweep: Vec<SweepOrderKind>,
}

fn default_version() -> u32 {
    PIPELINE_FILE_VERSION
}

impl Default for PipelineFile {
    fn default() -> Self {
        Self {
            version: PIPELINE_FILE_VERSION,
            name: "Untitled Pipeline".to_string(),
            description: String::new(),
            nodes: Vec::new(),
            sweep: Vec::new(),
        }
    }
}

impl PipelineFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Describe an existing pipeline
    pub fn from_pipeline(name: impl Into<String>, pipeline: &Pipeline) -> Result<Self> {
        Ok(Self {
            nodes: pipeline.to_configs()?,
            ..Self::new(name)
        })
    }

    pub fn with_node(mut self, node: NodeConfig) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_sweep(mut self, sweep: Vec<SweepOrderKind>) -> Self {
        self.sweep = sweep;
        self
    }

    /// Parse file contents in the given format
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        match format {
            FileFormat::Json => Ok(serde_json::from_str(content)?),
            FileFormat::Toml => {
                toml::from_str(content).map_err(|e| AcqProcError::Serialization(e.to_string()))
            }
        }
    }

    /// Render the file in the given format
    pub fn render(&self, format: FileFormat) -> Result<String> {
        match format {
            FileFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| AcqProcError::Serialization(e.to_string())),
        }
    }

    /// Load a pipeline file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AcqProcError::Config(format!("Failed to read pipeline file {:?}: {}", path, e))
        })?;

        let file = Self::parse(&content, FileFormat::from_path(path)).map_err(|e| {
            AcqProcError::Config(format!("Failed to parse pipeline file {:?}: {}", path, e))
        })?;

        if file.version > PIPELINE_FILE_VERSION {
            tracing::warn!(
                "Pipeline file {:?} has version {}, newer than supported {}",
                path,
                file.version,
                PIPELINE_FILE_VERSION
            );
        }
        tracing::info!("Loaded pipeline '{}' with {} nodes", file.name, file.nodes.len());
        Ok(file)
    }

    /// Save the pipeline file to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AcqProcError::Config(format!("Failed to create pipeline directory: {}", e))
            })?;
        }

        let content = self.render(FileFormat::from_path(path))?;
        std::fs::write(path, content).map_err(|e| {
            AcqProcError::Config(format!("Failed to write pipeline file {:?}: {}", path, e))
        })
    }

    /// Build fresh nodes from the stored descriptions
    pub fn build_pipeline(&self) -> Result<Pipeline> {
        Ok(Pipeline::from_configs(&self.nodes)?)
    }

    /// Visiting order of a sweep with the given shape
    pub fn sweep_order(&self, shape: &[usize]) -> Result<Vec<usize>> {
        Ok(sweep::sweep_order(shape, &self.sweep)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::nodes::{
        AxisConfig, BlockMeanConfig, DecimateConfig, FirChannelConfig, FirConfig,
    };
    use tempfile::TempDir;

    fn sample_file() -> PipelineFile {
        PipelineFile::new("readout")
            .with_node(NodeConfig::Fir(FirConfig::new(vec![FirChannelConfig::low_pass(
                31, 5.0e6,
            )])))
            .with_node(NodeConfig::Decimate(DecimateConfig::new("sample", 4)))
            .with_node(NodeConfig::BlockMean(BlockMeanConfig::new("segment", 2)))
            .with_node(NodeConfig::Mean(AxisConfig::new("repetition")))
            .with_sweep(vec![SweepOrderKind::Plain, SweepOrderKind::Snake])
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.toml")), FileFormat::Toml);
        assert_eq!(FileFormat::from_path(Path::new("a.TOML")), FileFormat::Toml);
        assert_eq!(FileFormat::from_path(Path::new("a.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a")), FileFormat::Json);
    }

    #[test]
    fn test_save_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipelines").join("readout.json");
        let file = sample_file();

        file.save(&path).unwrap();
        assert_eq!(PipelineFile::load(&path).unwrap(), file);
    }

    #[test]
    fn test_save_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readout.toml");
        let file = sample_file();

        file.save(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("type = \"decimate\""));
        assert_eq!(PipelineFile::load(&path).unwrap(), file);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let content = r#"
            name = "esd"

            [[nodes]]
            type = "esd"
            parameters = {}

            [[nodes]]
            type = "max"
            parameters = { parameter = "fft_frequency" }
        "#;
        let file = PipelineFile::parse(content, FileFormat::Toml).unwrap();
        assert_eq!(file.version, PIPELINE_FILE_VERSION);
        let pipeline = file.build_pipeline().unwrap();
        assert_eq!(pipeline.node_names(), ["ESD", "Max"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = PipelineFile::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AcqProcError::Config(_)));
    }

    #[test]
    fn test_invalid_node_fails_build() {
        let file = PipelineFile::new("bad")
            .with_node(NodeConfig::Decimate(DecimateConfig::new("sample", 0)));
        assert!(matches!(file.build_pipeline(), Err(AcqProcError::Pipeline(_))));
    }

    #[test]
    fn test_sweep_order_from_file() {
        let order = sample_file().sweep_order(&[2, 3]).unwrap();
        assert_eq!(order, [0, 1, 2, 5, 4, 3]);
        assert!(matches!(
            sample_file().sweep_order(&[6]),
            Err(AcqProcError::Sweep(_))
        ));
    }
}
