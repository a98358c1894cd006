//! Circular convolution of probability columns with an offset kernel.
//!
//! Purpose
//! -------
//! Blur every column of a `(domain × columns)` probability table by a kernel
//! expressed in offsets, with wrap-around boundaries. The observer model uses
//! it to add motor noise to the percept distribution of each trial.
//!
//! Key behaviors
//! -------------
//! - `y[i] = Σ_d a[(i − d) mod n] · k[d]`, where `k[d]` is the kernel mass at
//!   offset `d` (offset 0 = no displacement).
//! - [`CircularConvolver`] plans the forward/inverse FFT once for a length and
//!   reuses it for every column; [`circ_convolve`] is the direct O(n²) form
//!   kept as a reference.
//! - [`offset_kernel`] rotates a density evaluated on `1..=360` so the entry
//!   for degree 360 (offset 0) lands at index 0.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input columns and kernel have the same length `n`.
//! - FFT round-off can leave cells slightly below zero (order 1e-18); callers
//!   floor and renormalize afterwards.
use std::sync::Arc;

use ndarray::{Array1, Array2, Axis};
use rustfft::{Fft, FftPlanner, num_complex::Complex64};

/// FFT-backed circular convolution for a fixed length.
pub struct CircularConvolver {
    n: usize,
    fft: Arc<dyn Fft<f64>>,
    ifft: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for CircularConvolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircularConvolver").field("n", &self.n).finish()
    }
}

impl CircularConvolver {
    pub fn new(n: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        let ifft = planner.plan_fft_inverse(n);
        Self { n, fft, ifft }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Convolve every column of `table` with `kernel`.
    ///
    /// `table` must have `self.len()` rows and `kernel` `self.len()` entries.
    pub fn convolve_columns(&self, table: &Array2<f64>, kernel: &Array1<f64>) -> Array2<f64> {
        let n = self.n;
        let mut k_spec: Vec<Complex64> = kernel.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        self.fft.process(&mut k_spec);

        let scale = 1.0 / (n as f64);
        let mut out = Array2::<f64>::zeros(table.raw_dim());
        let mut buf = vec![Complex64::new(0.0, 0.0); n];
        for (src, mut dst) in table.axis_iter(Axis(1)).zip(out.axis_iter_mut(Axis(1))) {
            for (b, &x) in buf.iter_mut().zip(src.iter()) {
                *b = Complex64::new(x, 0.0);
            }
            self.fft.process(&mut buf);
            for (b, k) in buf.iter_mut().zip(k_spec.iter()) {
                *b *= *k;
            }
            self.ifft.process(&mut buf);
            for (d, b) in dst.iter_mut().zip(buf.iter()) {
                *d = b.re * scale;
            }
        }
        out
    }
}

/// Direct circular convolution (O(n²)).
pub fn circ_convolve(a: &[f64], k: &[f64]) -> Vec<f64> {
    let b = a.len();
    let mut y = vec![0.0; b];
    for (i, yi) in y.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (d, &kd) in k.iter().enumerate().take(b) {
            acc += a[(i + b - d) % b] * kd;
        }
        *yi = acc;
    }
    y
}

/// Rotate a density over `1..=n` into offset order (`360 → 0`, `1 → 1`, …).
pub fn offset_kernel(density: &Array1<f64>) -> Array1<f64> {
    let n = density.len();
    Array1::from_shape_fn(n, |d| density[(d + n - 1) % n])
}
