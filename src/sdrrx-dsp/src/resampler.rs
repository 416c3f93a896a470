// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Fractional windowed-sinc resampler (C8), grounded on
//! `nanosdr/nanodsp/fract_resampler.cpp`'s `FractResampler`: a precomputed
//! subsample-resolution sinc table, a `SINC_PERIODS`-sample history carried
//! across batches, and an output-time accumulator advanced by the ratio.

use std::f64::consts::PI;

const SINC_PERIODS: usize = 28;
const SINC_PERIOD_PTS: usize = 10_000;
const SINC_LENGTH: usize = SINC_PERIODS * SINC_PERIOD_PTS + 1;

fn blackman_harris(i: usize, n: usize) -> f64 {
    const A0: f64 = 0.35875;
    const A1: f64 = 0.48829;
    const A2: f64 = 0.14128;
    const A3: f64 = 0.01168;
    let x = 2.0 * PI * i as f64 / (n - 1) as f64;
    A0 - A1 * x.cos() + A2 * (2.0 * x).cos() - A3 * (3.0 * x).cos()
}

fn build_sinc_table() -> Vec<f64> {
    let mut table = Vec::with_capacity(SINC_LENGTH);
    let half = SINC_LENGTH / 2;
    for i in 0..SINC_LENGTH {
        let window = blackman_harris(i, SINC_LENGTH);
        if i == half {
            table.push(1.0);
        } else {
            let fi = PI * (i as f64 - half as f64) / SINC_PERIOD_PTS as f64;
            table.push(window * fi.sin() / fi);
        }
    }
    table
}

/// Arbitrary-ratio resampler operating on real (audio-rate) samples.
pub struct FractResampler {
    sinc_table: Vec<f64>,
    history: Vec<f32>,
    float_time: f64,
}

impl FractResampler {
    pub fn new() -> Self {
        Self {
            sinc_table: build_sinc_table(),
            history: vec![0.0; SINC_PERIODS],
            float_time: 0.0,
        }
    }

    /// Resample `input` at `rate = input_rate / output_rate`, appending
    /// output samples to `out`. Returns the number of samples produced.
    pub fn resample(&mut self, input: &[f32], rate: f64, out: &mut Vec<f32>) -> usize {
        let n = input.len();
        let mut buffer = Vec::with_capacity(SINC_PERIODS + n);
        buffer.extend_from_slice(&self.history);
        buffer.extend_from_slice(input);

        let start_len = out.len();
        let mut integer_time = self.float_time as i64;
        while (integer_time as usize) < n {
            let mut acc = 0.0f64;
            for i in 1..=SINC_PERIODS {
                let j = integer_time as usize + i;
                let sidx = ((j as f64 - self.float_time) * SINC_PERIOD_PTS as f64) as usize;
                acc += buffer[j] as f64 * self.sinc_table[sidx.min(self.sinc_table.len() - 1)];
            }
            out.push(acc as f32);
            self.float_time += rate;
            integer_time = self.float_time as i64;
        }
        self.float_time -= n as f64;

        let tail_start = n;
        self.history.copy_from_slice(&buffer[tail_start..tail_start + SINC_PERIODS]);

        out.len() - start_len
    }
}

impl Default for FractResampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_ratio_roughly_preserves_sample_count() {
        let mut resampler = FractResampler::new();
        let input: Vec<f32> = (0..2000)
            .map(|i| (2.0 * PI * 440.0 * i as f64 / 48_000.0).sin() as f32)
            .collect();
        let mut out = Vec::new();
        let produced = resampler.resample(&input, 1.0, &mut out);
        assert!((produced as i64 - input.len() as i64).abs() <= 2);
    }

    #[test]
    fn downsampling_ratio_halves_output_count() {
        let mut resampler = FractResampler::new();
        let input = vec![0.0f32; 4000];
        let mut out = Vec::new();
        let produced = resampler.resample(&input, 2.0, &mut out);
        assert!((produced as i64 - 2000).abs() <= 2);
    }

    #[test]
    fn history_carries_across_batches() {
        let mut resampler = FractResampler::new();
        let mut out = Vec::new();
        resampler.resample(&vec![1.0f32; 1000], 1.0, &mut out);
        let before = resampler.history.clone();
        out.clear();
        resampler.resample(&vec![1.0f32; 1000], 1.0, &mut out);
        // Steady DC input should leave the history essentially unchanged.
        for (a, b) in before.iter().zip(resampler.history.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
