// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Complex FFT engine shared by the spectrum producer and the fast FIR
//! channel filter, grounded on the `rustfft`-based transforms in
//! `SpectrumSnapshotter` and `BlockFirFilterPair`.

use std::f32::consts::PI;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use sdrrx_core::{SdrError, SdrResult};

/// How [`FftEngine::forward`] treats its input before transforming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftMode {
    /// Apply a Hann window (gain 2) and accumulate into an internal ring
    /// before transforming; used by the spectrum thread.
    Spectrum,
    /// No windowing; used by the fast-convolution channel filter.
    FastConvolution,
}

/// Power-of-two complex FFT engine, `size` in `[512, 65536]`.
pub struct FftEngine {
    size: usize,
    mode: FftMode,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FftEngine {
    pub const MIN_SIZE: usize = 512;
    pub const MAX_SIZE: usize = 65536;

    pub fn new(size: usize, mode: FftMode) -> SdrResult<Self> {
        if !(Self::MIN_SIZE..=Self::MAX_SIZE).contains(&size) || !size.is_power_of_two() {
            return Err(SdrError::invalid(format!(
                "fft size {size} must be a power of two in [{}, {}]",
                Self::MIN_SIZE,
                Self::MAX_SIZE
            )));
        }

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        let window = match mode {
            FftMode::Spectrum => (0..size)
                .map(|i| 2.0 * 0.5 * (1.0 - (2.0 * PI * i as f32 / (size - 1) as f32).cos()))
                .collect(),
            FftMode::FastConvolution => Vec::new(),
        };

        Ok(Self {
            size,
            mode,
            fft,
            ifft,
            window,
            accum: Vec::with_capacity(size),
            scratch: vec![Complex::new(0.0, 0.0); size],
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Append samples to the spectrum-mode accumulation ring. No-op in
    /// fast-convolution mode.
    pub fn feed(&mut self, samples: &[Complex<f32>]) {
        if self.mode != FftMode::Spectrum {
            return;
        }
        for &s in samples {
            if self.accum.len() == self.size {
                self.accum.remove(0);
            }
            self.accum.push(s);
        }
    }

    /// Spectrum-mode output: `None` until `size` samples have accumulated.
    pub fn get_output(&mut self) -> Option<Vec<Complex<f32>>> {
        debug_assert_eq!(self.mode, FftMode::Spectrum);
        if self.accum.len() < self.size {
            return None;
        }
        for (i, s) in self.accum.iter().enumerate() {
            self.scratch[i] = Complex::new(s.re * self.window[i], s.im * self.window[i]);
        }
        self.fft.process(&mut self.scratch);
        Some(self.scratch.clone())
    }

    /// In-place forward transform for fast-convolution callers: `buf` must
    /// already be zero-padded to `size`. No allocation.
    pub fn forward_in_place(&self, buf: &mut [Complex<f32>]) {
        debug_assert_eq!(buf.len(), self.size);
        self.fft.process(buf);
    }

    /// In-place inverse transform, normalized by `1/size` so that
    /// `forward_in_place` followed by `inverse_in_place` reproduces the
    /// original input.
    pub fn inverse_in_place(&self, buf: &mut [Complex<f32>]) {
        debug_assert_eq!(buf.len(), self.size);
        self.ifft.process(buf);
        let scale = 1.0 / self.size as f32;
        for s in buf.iter_mut() {
            *s *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two() {
        assert!(FftEngine::new(1000, FftMode::FastConvolution).is_err());
    }

    #[test]
    fn rejects_out_of_range_size() {
        assert!(FftEngine::new(256, FftMode::FastConvolution).is_err());
        assert!(FftEngine::new(131072, FftMode::FastConvolution).is_err());
    }

    #[test]
    fn spectrum_mode_withholds_output_until_full() {
        let mut engine = FftEngine::new(512, FftMode::Spectrum).unwrap();
        engine.feed(&vec![Complex::new(1.0, 0.0); 100]);
        assert!(engine.get_output().is_none());
        engine.feed(&vec![Complex::new(1.0, 0.0); 412]);
        assert!(engine.get_output().is_some());
    }

    #[test]
    fn forward_inverse_roundtrip_reproduces_random_input() {
        // Deterministic PRNG (xorshift32) so the test has no external
        // rand dependency but still exercises a random complex vector.
        let mut state: u32 = 0x9E3779B9;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32) * 2.0 - 1.0
        };

        let engine = FftEngine::new(512, FftMode::FastConvolution).unwrap();
        let original: Vec<Complex<f32>> = (0..512).map(|_| Complex::new(next(), next())).collect();

        let mut buf = original.clone();
        engine.forward_in_place(&mut buf);
        engine.inverse_in_place(&mut buf);

        // Scale the per-component error against the vector's own amplitude
        // rather than each component individually, since a component that
        // happens to land near zero would otherwise blow up a relative-error
        // ratio that has nothing to do with the transform's actual accuracy.
        let scale = original.iter().map(|s| s.norm()).fold(0.0f32, f32::max).max(1e-12);
        for (a, b) in original.iter().zip(buf.iter()) {
            let rel = (a - b).norm() / scale;
            assert!(rel < 1e-5, "relative error {rel} too large: {a:?} vs {b:?}");
        }
    }
}
