// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! PLL-based NFM/APT discriminator (`demod/fm.rs` uses a cross-product
//! `atan2` discriminator instead); the loop-filter structure follows the
//! standard natural-frequency/damping gain derivation for a second-order
//! costas-style PLL.

use std::f64::consts::TAU;

use num_complex::Complex;

const FMPLL_RANGE_NARROW_HZ: f64 = 10_000.0;
const FMPLL_RANGE_APT_HZ: f64 = 30_000.0;
const DAMPING: f64 = 0.707;
const MAX_FMOUT: f64 = 1.0;

pub struct NfmDemodulator {
    sample_rate: f64,
    alpha: f64,
    beta: f64,
    nco_freq: f64,
    nco_phase: f64,
    nco_hi_limit: f64,
    dc_alpha: f64,
    dc_avg: f64,
    out_gain: f64,
}

impl NfmDemodulator {
    pub fn new(sample_rate: f64, bandwidth: f64, wide: bool) -> Self {
        let fs = sample_rate.max(1.0);
        let bw = bandwidth.max(1.0);
        let alpha = 2.0 * DAMPING * bw * TAU / fs;
        let beta = alpha * alpha / (4.0 * DAMPING * DAMPING);
        let range_hz = if wide {
            FMPLL_RANGE_APT_HZ
        } else {
            FMPLL_RANGE_NARROW_HZ
        };
        let nco_hi_limit = range_hz * TAU / fs;

        Self {
            sample_rate: fs,
            alpha,
            beta,
            nco_freq: 0.0,
            nco_phase: 0.0,
            nco_hi_limit,
            dc_alpha: 1.0 - (-1.0 / (fs * 0.001)).exp(),
            dc_avg: 0.0,
            out_gain: MAX_FMOUT / nco_hi_limit,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64, bandwidth: f64, wide: bool) {
        *self = Self::new(sample_rate, bandwidth, wide);
    }

    pub fn demodulate(&mut self, samples: &[Complex<f32>]) -> Vec<f32> {
        let mut out = Vec::with_capacity(samples.len());
        for &s in samples {
            let rot = Complex::new(
                (-self.nco_phase).cos() as f32,
                (-self.nco_phase).sin() as f32,
            );
            let mixed = s * rot;
            let e = -(mixed.im as f64).atan2(mixed.re as f64);

            self.nco_freq = (self.nco_freq + self.beta * e)
                .clamp(-self.nco_hi_limit, self.nco_hi_limit);
            self.nco_phase = (self.nco_phase + self.nco_freq + self.alpha * e) % TAU;

            self.dc_avg += self.dc_alpha * (self.nco_freq - self.dc_avg);

            out.push(((self.nco_freq - self.dc_avg) * self.out_gain) as f32);
        }
        out
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq_hz: f64, fs: f64, n: usize) -> Vec<Complex<f32>> {
        (0..n)
            .map(|i| {
                let theta = TAU * freq_hz * i as f64 / fs;
                Complex::new(theta.cos() as f32, theta.sin() as f32)
            })
            .collect()
    }

    #[test]
    fn locks_to_constant_offset_tone_with_nonzero_output() {
        let fs = 48_000.0;
        let mut demod = NfmDemodulator::new(fs, 2500.0, false);
        let input = tone(1500.0, fs, 4000);
        let out = demod.demodulate(&input);
        let settled: f32 = out[out.len() - 200..].iter().sum::<f32>() / 200.0;
        assert!(settled.abs() > 1e-4, "expected nonzero discriminator output");
    }

    #[test]
    fn silence_at_dc_decays_toward_zero() {
        let fs = 48_000.0;
        let mut demod = NfmDemodulator::new(fs, 2500.0, false);
        let input = vec![Complex::new(1.0, 0.0); 10_000];
        let out = demod.demodulate(&input);
        let tail: f32 = out[out.len() - 200..].iter().map(|v| v.abs()).sum::<f32>() / 200.0;
        assert!(tail < 0.05, "residual discriminator output {tail}");
    }

    #[test]
    fn apt_variant_has_wider_capture_range_than_narrow() {
        let narrow = NfmDemodulator::new(48_000.0, 2500.0, false);
        let apt = NfmDemodulator::new(48_000.0, 2500.0, true);
        assert!(apt.nco_hi_limit > narrow.nco_hi_limit);
    }
}
