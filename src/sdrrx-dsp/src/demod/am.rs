// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::f32::consts::PI;

use num_complex::Complex;

use super::DcBlocker;

fn windowed_sinc_coeffs(cutoff_norm: f32, taps: usize) -> Vec<f32> {
    let m = (taps - 1) as f32;
    let mut coeffs = Vec::with_capacity(taps);
    for i in 0..taps {
        let x = i as f32 - m / 2.0;
        let sinc = if x == 0.0 {
            2.0 * cutoff_norm
        } else {
            (2.0 * PI * cutoff_norm * x).sin() / (PI * x)
        };
        let window = 0.5 * (1.0 - (2.0 * PI * i as f32 / m).cos());
        coeffs.push(sinc * window);
    }
    let sum: f32 = coeffs.iter().sum();
    if sum.abs() > 1e-12 {
        for c in &mut coeffs {
            *c /= sum;
        }
    }
    coeffs
}

/// Linear-phase post-detection low-pass, sample-by-sample (audio-rate, so
/// the overlap-save machinery used for the channel filter isn't needed).
struct PostLpf {
    coeffs: Vec<f32>,
    state: Vec<f32>,
    pos: usize,
}

impl PostLpf {
    fn new(cutoff_norm: f32, taps: usize) -> Self {
        Self {
            coeffs: windowed_sinc_coeffs(cutoff_norm, taps),
            state: vec![0.0; taps.saturating_sub(1)],
            pos: 0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let n = self.state.len();
        if n == 0 {
            return x * self.coeffs[0];
        }
        self.state[self.pos] = x;
        self.pos = (self.pos + 1) % n;
        let mut acc = self.coeffs[0] * x;
        for k in 1..self.coeffs.len() {
            let idx = (self.pos + n - k) % n;
            acc += self.coeffs[k] * self.state[idx];
        }
        acc
    }
}

/// AM envelope detector with DC removal and post-detection low-pass.
pub struct AmDemodulator {
    dc: DcBlocker,
    lpf: PostLpf,
}

impl AmDemodulator {
    pub fn new() -> Self {
        Self {
            dc: DcBlocker::new(0.995),
            // 31-tap post LPF, cutoff chosen conservatively for a voice
            // channel; the channel filter upstream already bandlimits.
            lpf: PostLpf::new(0.15, 31),
        }
    }

    pub fn demodulate(&mut self, samples: &[Complex<f32>]) -> Vec<f32> {
        samples
            .iter()
            .map(|s| {
                let env = (s.re * s.re + s.im * s.im).sqrt();
                let dc_removed = self.dc.process(env);
                self.lpf.process(dc_removed)
            })
            .collect()
    }
}

impl Default for AmDemodulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_envelope_settles_near_zero_after_dc_block() {
        let mut demod = AmDemodulator::new();
        let input: Vec<Complex<f32>> = (0..4000).map(|_| Complex::new(1.0, 0.0)).collect();
        let out = demod.demodulate(&input);
        let tail_avg: f32 = out[out.len() - 200..].iter().sum::<f32>() / 200.0;
        assert!(tail_avg.abs() < 0.05, "residual DC {tail_avg}");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let mut demod = AmDemodulator::new();
        assert!(demod.demodulate(&[]).is_empty());
    }
}
