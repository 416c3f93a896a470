// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! S-meter and squelch gate: `rms_db = 10*log10(mean(|x|^2) + eps)`.

use num_complex::Complex;

const EPS: f64 = 1e-12;

pub struct SMeter {
    squelch_db: f64,
    last_rms_db: f64,
}

impl SMeter {
    pub fn new(squelch_db: f64) -> Self {
        Self {
            squelch_db,
            last_rms_db: -160.0,
        }
    }

    pub fn set_squelch(&mut self, squelch_db: f64) {
        self.squelch_db = squelch_db;
    }

    pub fn last_rms_db(&self) -> f64 {
        self.last_rms_db
    }

    /// Updates the meter from a block and reports whether the block is
    /// above the squelch threshold (i.e. audio should be produced).
    pub fn measure(&mut self, block: &[Complex<f32>]) -> bool {
        if block.is_empty() {
            return self.last_rms_db >= self.squelch_db;
        }
        let mean_power: f64 = block
            .iter()
            .map(|s| (s.re * s.re + s.im * s.im) as f64)
            .sum::<f64>()
            / block.len() as f64;
        self.last_rms_db = 10.0 * (mean_power + EPS).log10();
        self.last_rms_db >= self.squelch_db
    }
}
