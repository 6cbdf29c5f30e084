//! Windowed-sinc FIR design and shape-preserving convolution.
//!
//! Cutoffs are given in hertz and normalized against the Nyquist rate of the
//! channel being filtered. High-pass kernels are the spectral complement of
//! the matching low-pass kernel.

use crate::analysis::window::WindowFunction;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Pass band of a FIR kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[serde(alias = "lowpass", alias = "low")]
    LowPass,
    #[serde(alias = "highpass", alias = "high")]
    HighPass,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FirDesignError {
    #[error("a FIR kernel needs at least one tap")]
    NoTaps,

    #[error("high-pass kernels need an odd tap count, got {0}")]
    EvenHighPass(usize),

    #[error("cutoff {cutoff} Hz must lie strictly between 0 and the Nyquist rate {nyquist} Hz")]
    CutoffOutOfRange { cutoff: f64, nyquist: f64 },

    #[error("{window} window with {taps} taps has zero DC gain")]
    DegenerateWindow { window: WindowFunction, taps: usize },
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Low-pass kernel with unit gain at DC.
pub fn lowpass_kernel(
    taps: usize,
    cutoff: f64,
    nyquist: f64,
    window: WindowFunction,
) -> Result<Vec<f64>, FirDesignError> {
    if taps == 0 {
        return Err(FirDesignError::NoTaps);
    }
    if cutoff.is_nan() || nyquist.is_nan() || cutoff <= 0.0 || cutoff >= nyquist {
        return Err(FirDesignError::CutoffOutOfRange { cutoff, nyquist });
    }

    let c = cutoff / nyquist;
    let alpha = (taps - 1) as f64 / 2.0;
    let mut kernel: Vec<f64> = (0..taps)
        .map(|n| {
            let m = n as f64 - alpha;
            c * sinc(c * m) * window.symmetric_coefficient(n, taps)
        })
        .collect();

    let gain: f64 = kernel.iter().sum();
    if gain == 0.0 || !gain.is_finite() {
        return Err(FirDesignError::DegenerateWindow { window, taps });
    }
    for h in &mut kernel {
        *h /= gain;
    }
    Ok(kernel)
}

/// Design a kernel of the given kind.
pub fn design_kernel(
    kind: FilterKind,
    taps: usize,
    cutoff: f64,
    nyquist: f64,
    window: WindowFunction,
) -> Result<Vec<f64>, FirDesignError> {
    match kind {
        FilterKind::LowPass => lowpass_kernel(taps, cutoff, nyquist, window),
        FilterKind::HighPass => {
            if taps % 2 == 0 {
                return Err(FirDesignError::EvenHighPass(taps));
            }
            let mut kernel = lowpass_kernel(taps, cutoff, nyquist, window)?;
            for h in &mut kernel {
                *h = -*h;
            }
            kernel[taps / 2] += 1.0;
            Ok(kernel)
        }
    }
}

/// Index into `0..n` after half-sample symmetric reflection (`d c b a | a b c d | d c b a`).
fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let mut m = i.rem_euclid(period);
    if m >= n {
        m = period - 1 - m;
    }
    m as usize
}

/// Convolve `signal` with `kernel`, returning an output of the same length.
///
/// Samples past either edge are taken from the reflected signal.
pub fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n == 0 || kernel.is_empty() {
        return signal.to_vec();
    }
    let half = (kernel.len() / 2) as isize;

    (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(j, &h)| h * signal[reflect_index(i + half - j as isize, n)])
                .sum()
        })
        .collect()
}
