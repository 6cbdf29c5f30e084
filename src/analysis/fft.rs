//! FFT (Fast Fourier Transform) primitives
//!
//! Provides the complex transform of every lane of an n-dimensional array
//! along its innermost axis, and the matching frequency-bin coordinates.

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use rustfft::{num_complex::Complex, FftPlanner};

/// Frequency of each FFT bin for `n` samples spaced `dt` seconds apart.
///
/// Bins follow the standard ordering: non-negative frequencies first, then
/// the negative (wrap-around) frequencies in increasing order.
pub fn fft_frequencies(n: usize, dt: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let scale = 1.0 / (n as f64 * dt);
    let positive = (n - 1) / 2 + 1;
    (0..positive as i64)
        .chain(-((n / 2) as i64)..0)
        .map(|k| k as f64 * scale)
        .collect()
}

/// Spectrum of a complex signal given as separate real and imaginary arrays.
pub struct Spectrum {
    pub real: ArrayD<f64>,
    pub imag: ArrayD<f64>,
}

impl Spectrum {
    /// Squared magnitude of every bin.
    pub fn energy(&self) -> ArrayD<f64> {
        let mut esd = self.real.mapv(|r| r * r);
        esd.zip_mut_with(&self.imag, |e, &i| *e += i * i);
        esd
    }
}

/// Forward complex FFT of every lane along the innermost axis.
///
/// `imag` may be omitted for real input. Both arrays must share one shape.
pub fn fft_innermost(real: ArrayViewD<f64>, imag: Option<ArrayViewD<f64>>) -> Spectrum {
    let shape = real.shape().to_vec();
    let mut out_real = ArrayD::<f64>::zeros(IxDyn(&shape));
    let mut out_imag = ArrayD::<f64>::zeros(IxDyn(&shape));

    let Some(&n) = shape.last() else {
        // Rank-0: a single sample is its own transform.
        out_real.assign(&real);
        if let Some(imag) = imag {
            out_imag.assign(&imag);
        }
        return Spectrum {
            real: out_real,
            imag: out_imag,
        };
    };
    if n == 0 {
        return Spectrum {
            real: out_real,
            imag: out_imag,
        };
    }

    let axis = Axis(shape.len() - 1);
    let fft = FftPlanner::<f64>::new().plan_fft_forward(n);
    let mut buffer = vec![Complex::new(0.0, 0.0); n];

    let imag_lanes: Vec<_> = match &imag {
        Some(imag) => imag.lanes(axis).into_iter().map(Some).collect(),
        None => Vec::new(),
    };

    for (lane_idx, ((re_in, mut re_out), mut im_out)) in real
        .lanes(axis)
        .into_iter()
        .zip(out_real.lanes_mut(axis))
        .zip(out_imag.lanes_mut(axis))
        .enumerate()
    {
        let im_in = imag_lanes.get(lane_idx).copied().flatten();
        for (k, slot) in buffer.iter_mut().enumerate() {
            let im = im_in.map_or(0.0, |lane| lane[k]);
            *slot = Complex::new(re_in[k], im);
        }

        fft.process(&mut buffer);

        for (k, c) in buffer.iter().enumerate() {
            re_out[k] = c.re;
            im_out[k] = c.im;
        }
    }

    Spectrum {
        real: out_real,
        imag: out_imag,
    }
}
