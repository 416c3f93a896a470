// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Numerically controlled oscillator used for frequency translation.

use std::f64::consts::TAU;

use num_complex::Complex;

/// Unit-modulus complex oscillator advanced by incremental complex
/// multiplication, with a Newton-step amplitude correction to stop the
/// phasor from drifting off the unit circle over long runs.
#[derive(Debug, Clone, Copy)]
pub struct Nco {
    phasor: Complex<f32>,
    increment: Complex<f32>,
    freq_hz: f64,
    sample_rate: f64,
}

impl Nco {
    pub fn new(sample_rate: f64) -> Self {
        let mut nco = Self {
            phasor: Complex::new(1.0, 0.0),
            increment: Complex::new(1.0, 0.0),
            freq_hz: 0.0,
            sample_rate: sample_rate.max(1.0),
        };
        nco.recompute_increment();
        nco
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate.max(1.0);
        self.recompute_increment();
    }

    /// Tuning offset in Hz, positive shifts the signal down in frequency
    /// when multiplied (mixes a tone at `+freq_hz` down to DC).
    pub fn set_frequency(&mut self, freq_hz: f64) {
        self.freq_hz = freq_hz;
        self.recompute_increment();
    }

    pub fn frequency(&self) -> f64 {
        self.freq_hz
    }

    fn recompute_increment(&mut self) {
        let theta = -TAU * self.freq_hz / self.sample_rate;
        self.increment = Complex::new(theta.cos() as f32, theta.sin() as f32);
    }

    /// Advance one sample and return the current phasor (pre-advance value),
    /// matching the "multiply then rotate" convention used by the channel
    /// mixer.
    #[inline]
    pub fn next(&mut self) -> Complex<f32> {
        let out = self.phasor;
        self.phasor *= self.increment;
        // First-order Newton step toward |o| == 1: o *= (1.99 - |o|^2).
        let mag_sq = self.phasor.re * self.phasor.re + self.phasor.im * self.phasor.im;
        self.phasor *= 1.99 - mag_sq;
        out
    }

    /// Mix a block of samples by `self`'s tuning offset, in place.
    pub fn mix(&mut self, samples: &mut [Complex<f32>]) {
        for s in samples.iter_mut() {
            *s *= self.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frequency_is_identity() {
        let mut nco = Nco::new(48_000.0);
        let mut samples = vec![Complex::new(0.3, 0.7), Complex::new(-1.0, 0.5)];
        let original = samples.clone();
        nco.mix(&mut samples);
        for (a, b) in original.iter().zip(samples.iter()) {
            assert!((a.re - b.re).abs() < 1e-5);
            assert!((a.im - b.im).abs() < 1e-5);
        }
    }

    #[test]
    fn phasor_stays_near_unit_modulus_over_many_samples() {
        let mut nco = Nco::new(48_000.0);
        nco.set_frequency(1000.0);
        let mut mag = 1.0f32;
        for _ in 0..200_000 {
            let p = nco.next();
            mag = (p.re * p.re + p.im * p.im).sqrt();
        }
        assert!((mag - 1.0).abs() < 1e-3, "|o| drifted to {mag}");
    }

    #[test]
    fn frequency_reported_back() {
        let mut nco = Nco::new(48_000.0);
        nco.set_frequency(1234.5);
        assert_eq!(nco.frequency(), 1234.5);
    }
}
