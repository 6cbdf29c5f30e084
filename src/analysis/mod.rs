//! Signal processing primitives used by the pipeline nodes.
//!
//! - FFT along the innermost axis and frequency bins
//! - Windowed-sinc FIR design and same-length convolution
//! - Window functions

pub mod fft;
pub mod fir;
pub mod window;

pub use fft::{fft_frequencies, fft_innermost, Spectrum};
pub use fir::{convolve_same, design_kernel, lowpass_kernel, FilterKind, FirDesignError};
pub use window::WindowFunction;
