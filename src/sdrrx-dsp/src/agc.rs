// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Look-ahead log-domain AGC, grounded on `nanosdr/nanodsp/agc.cpp`'s
//! `CAgc`: a delay line whose output gain is decided from a sliding peak of
//! *future* samples, dual attack/decay averagers, and an optional hang mode.

use num_complex::Complex;
use sdrrx_core::AgcParams;

const DELAY_TIMECONST: f64 = 0.015;
const WINDOW_TIMECONST: f64 = 0.018;
const ATTACK_RISE_TIMECONST: f64 = 0.002;
const ATTACK_FALL_TIMECONST: f64 = 0.005;
const DECAY_RISEFALL_RATIO: f64 = 0.3;
const RELEASE_TIMECONST: f64 = 0.05;
const AGC_OUTSCALE: f64 = 0.5;
const MIN_CONSTANT: f64 = 1e-8;

pub struct Agc {
    params: AgcParams,

    manual_gain: f64,
    knee: f64,
    gain_slope: f64,
    fixed_gain: f64,

    attack_rise_alpha: f64,
    attack_fall_alpha: f64,
    decay_rise_alpha: f64,
    decay_fall_alpha: f64,

    delay_samples: usize,
    window_samples: usize,
    hang_time: usize,

    delay_buf: Vec<Complex<f32>>,
    delay_pos: usize,
    mag_buf: Vec<f64>,
    mag_pos: usize,
    peak: f64,
    attack_ave: f64,
    decay_ave: f64,
    hang_timer: usize,
}

impl Agc {
    pub fn new(params: AgcParams) -> Self {
        let mut agc = Self {
            params,
            manual_gain: 1.0,
            knee: 0.0,
            gain_slope: 0.0,
            fixed_gain: 1.0,
            attack_rise_alpha: 0.0,
            attack_fall_alpha: 0.0,
            decay_rise_alpha: 0.0,
            decay_fall_alpha: 0.0,
            delay_samples: 1,
            window_samples: 1,
            hang_time: 0,
            delay_buf: Vec::new(),
            delay_pos: 0,
            mag_buf: Vec::new(),
            mag_pos: 0,
            peak: -16.0,
            attack_ave: -5.0,
            decay_ave: -5.0,
            hang_timer: 0,
        };
        agc.reconfigure(params);
        agc
    }

    pub fn reconfigure(&mut self, params: AgcParams) {
        let fs = params.sample_rate.max(1.0);

        self.manual_gain = 10f64.powf(params.manual_gain_db / 20.0);
        self.knee = params.threshold_db / 20.0;
        self.gain_slope = params.slope_db / 100.0;
        self.fixed_gain = AGC_OUTSCALE * 10f64.powf(self.knee * (self.gain_slope - 1.0));

        self.attack_rise_alpha = 1.0 - (-1.0 / (fs * ATTACK_RISE_TIMECONST)).exp();
        self.attack_fall_alpha = 1.0 - (-1.0 / (fs * ATTACK_FALL_TIMECONST)).exp();
        self.decay_rise_alpha =
            1.0 - (-1.0 / (fs * params.decay_ms * 1e-3 * DECAY_RISEFALL_RATIO)).exp();
        self.decay_fall_alpha = if params.use_hang {
            1.0 - (-1.0 / (fs * RELEASE_TIMECONST)).exp()
        } else {
            1.0 - (-1.0 / (fs * params.decay_ms * 1e-3)).exp()
        };

        self.hang_time = (fs * params.decay_ms * 1e-3) as usize;
        self.delay_samples = ((fs * DELAY_TIMECONST) as usize).max(1);
        self.window_samples = ((fs * WINDOW_TIMECONST) as usize).max(1);

        self.delay_buf = vec![Complex::new(0.0, 0.0); self.delay_samples];
        self.mag_buf = vec![-16.0; self.window_samples];
        self.delay_pos = 0;
        self.mag_pos = 0;
        self.peak = -16.0;
        self.attack_ave = -5.0;
        self.decay_ave = -5.0;
        self.hang_timer = 0;

        self.params = params;
    }

    pub fn process(&mut self, input: &[Complex<f32>], out: &mut Vec<Complex<f32>>) {
        out.clear();
        out.reserve(input.len());

        if !self.params.on {
            for &s in input {
                out.push(s * self.manual_gain as f32);
            }
            return;
        }

        for &s in input {
            let delayed = self.delay_buf[self.delay_pos];
            self.delay_buf[self.delay_pos] = s;
            self.delay_pos += 1;
            if self.delay_pos >= self.delay_samples {
                self.delay_pos = 0;
            }

            let mag = (s.re.abs().max(s.im.abs()) as f64 + MIN_CONSTANT).log10();

            let oldest = self.mag_buf[self.mag_pos];
            self.mag_buf[self.mag_pos] = mag;
            self.mag_pos += 1;
            if self.mag_pos >= self.window_samples {
                self.mag_pos = 0;
            }

            if mag > self.peak {
                self.peak = mag;
            } else if oldest == self.peak {
                self.peak = self.mag_buf.iter().cloned().fold(-8.0, f64::max);
            }

            if self.params.use_hang {
                self.attack_ave = if self.peak > self.attack_ave {
                    (1.0 - self.attack_rise_alpha) * self.attack_ave
                        + self.attack_rise_alpha * self.peak
                } else {
                    (1.0 - self.attack_fall_alpha) * self.attack_ave
                        + self.attack_fall_alpha * self.peak
                };

                if self.peak > self.decay_ave {
                    self.decay_ave = (1.0 - self.decay_rise_alpha) * self.decay_ave
                        + self.decay_rise_alpha * self.peak;
                    self.hang_timer = 0;
                } else if self.hang_timer < self.hang_time {
                    self.hang_timer += 1;
                } else {
                    self.decay_ave = (1.0 - self.decay_fall_alpha) * self.decay_ave
                        + self.decay_fall_alpha * self.peak;
                }
            } else {
                self.attack_ave = if self.peak > self.attack_ave {
                    (1.0 - self.attack_rise_alpha) * self.attack_ave
                        + self.attack_rise_alpha * self.peak
                } else {
                    (1.0 - self.attack_fall_alpha) * self.attack_ave
                        + self.attack_fall_alpha * self.peak
                };
                self.decay_ave = if self.peak > self.decay_ave {
                    (1.0 - self.decay_rise_alpha) * self.decay_ave
                        + self.decay_rise_alpha * self.peak
                } else {
                    (1.0 - self.decay_fall_alpha) * self.decay_ave
                        + self.decay_fall_alpha * self.peak
                };
            }

            let mag = self.attack_ave.max(self.decay_ave);
            let gain = if mag <= self.knee {
                self.fixed_gain
            } else {
                AGC_OUTSCALE * 10f64.powf(mag * (self.gain_slope - 1.0))
            };

            out.push(Complex::new(
                (delayed.re as f64 * gain) as f32,
                (delayed.im as f64 * gain) as f32,
            ));
        }
    }
}
