// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use num_complex::Complex;

/// SSB/CW demodulator: the real part of the (already channel-filtered,
/// sideband-selected) baseband IQ, after an optional BFO translation for CW.
pub struct SsbDemodulator {
    sample_rate: f64,
    bfo_freq: f64,
    bfo_phase: f64,
}

impl SsbDemodulator {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
            bfo_freq: 0.0,
            bfo_phase: 0.0,
        }
    }

    /// Sets the CW beat-frequency-oscillator offset in Hz (0 disables it).
    pub fn set_bfo(&mut self, freq_hz: f64) {
        self.bfo_freq = freq_hz;
    }

    pub fn demodulate(&mut self, samples: &[Complex<f32>]) -> Vec<f32> {
        if self.bfo_freq == 0.0 {
            return samples.iter().map(|s| s.re).collect();
        }

        let step = std::f64::consts::TAU * self.bfo_freq / self.sample_rate;
        let mut out = Vec::with_capacity(samples.len());
        for s in samples {
            let rot = Complex::new(self.bfo_phase.cos() as f32, self.bfo_phase.sin() as f32);
            out.push((s * rot).re);
            self.bfo_phase = (self.bfo_phase + step) % std::f64::consts::TAU;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bfo_takes_real_part() {
        let mut demod = SsbDemodulator::new(48_000.0);
        let input = vec![Complex::new(1.0, 2.0), Complex::new(-3.0, 0.5)];
        assert_eq!(demod.demodulate(&input), vec![1.0, -3.0]);
    }

    #[test]
    fn bfo_rotates_output() {
        let mut demod = SsbDemodulator::new(48_000.0);
        demod.set_bfo(700.0);
        let input = vec![Complex::new(1.0, 0.0); 10];
        let out = demod.demodulate(&input);
        assert_eq!(out.len(), 10);
        assert_ne!(out, vec![1.0; 10]);
    }
}
