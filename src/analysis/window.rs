//! Window functions for filter design and spectral preprocessing.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Window function applied to a filter kernel or an FFT frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// Rectangular window (no windowing)
    #[serde(alias = "boxcar")]
    Rectangular,
    /// Hann window
    #[serde(alias = "hanning")]
    Hann,
    /// Hamming window (default for FIR design)
    #[default]
    Hamming,
    /// Blackman window (very low side lobes)
    Blackman,
    /// Flat-top window (accurate amplitude measurement)
    #[serde(alias = "flat-top")]
    FlatTop,
}

impl WindowFunction {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            WindowFunction::Rectangular => "Rectangular",
            WindowFunction::Hann => "Hann",
            WindowFunction::Hamming => "Hamming",
            WindowFunction::Blackman => "Blackman",
            WindowFunction::FlatTop => "Flat-Top",
        }
    }

    /// Get all window functions
    pub fn all() -> &'static [WindowFunction] {
        &[
            WindowFunction::Rectangular,
            WindowFunction::Hann,
            WindowFunction::Hamming,
            WindowFunction::Blackman,
            WindowFunction::FlatTop,
        ]
    }

    /// Window value at phase `x = i / period`, with `x` in `[0, 1]`.
    fn at_phase(&self, x: f64) -> f64 {
        match self {
            WindowFunction::Rectangular => 1.0,
            WindowFunction::Hann => 0.5 * (1.0 - (2.0 * PI * x).cos()),
            WindowFunction::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
            WindowFunction::Blackman => {
                // Exactly 0 at the endpoints, but rounding can produce -ε.
                (0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()).max(0.0)
            }
            WindowFunction::FlatTop => {
                let a0 = 0.21557895;
                let a1 = 0.41663158;
                let a2 = 0.277263158;
                let a3 = 0.083578947;
                let a4 = 0.006947368;
                a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
                    - a3 * (6.0 * PI * x).cos()
                    + a4 * (8.0 * PI * x).cos()
            }
        }
    }

    /// Periodic window coefficient at position i out of n samples (spectral analysis form)
    pub fn coefficient(&self, i: usize, n: usize) -> f64 {
        self.at_phase(i as f64 / n as f64)
    }

    /// Symmetric window coefficient at position i out of n samples (filter design form)
    pub fn symmetric_coefficient(&self, i: usize, n: usize) -> f64 {
        if n <= 1 {
            return 1.0;
        }
        self.at_phase(i as f64 / (n - 1) as f64)
    }

    /// Generate periodic window coefficients for n samples
    pub fn generate(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.coefficient(i, n)).collect()
    }

    /// Generate symmetric window coefficients for n samples
    pub fn generate_symmetric(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.symmetric_coefficient(i, n)).collect()
    }
}

impl FromStr for WindowFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangular" | "boxcar" => Ok(WindowFunction::Rectangular),
            "hann" | "hanning" => Ok(WindowFunction::Hann),
            "hamming" => Ok(WindowFunction::Hamming),
            "blackman" => Ok(WindowFunction::Blackman),
            "flattop" | "flat-top" => Ok(WindowFunction::FlatTop),
            other => Err(format!("unknown window function '{}'", other)),
        }
    }
}

impl std::fmt::Display for WindowFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
