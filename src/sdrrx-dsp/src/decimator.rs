// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Half-band decimate-by-2 cascade (C3), grounded on
//! `nanosdr/nanodsp/filter/decimator.{h,cpp}`'s `Decimator` /
//! `CHalfBandDecimateBy2`. The original's hand-unrolled 11-tap fast path is
//! a throughput optimization, not a behavioral difference from the generic
//! half-band convolution, so only the generic stage is implemented here (see
//! DESIGN.md).

use num_complex::Complex;
use sdrrx_core::{SdrError, SdrResult};

pub const MAX_DECIMATION: u32 = 512;

/// Stop-band attenuation tier, selecting the tap-count table for each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttenuationTier {
    Db70,
    Db100,
    Db140,
}

impl AttenuationTier {
    pub fn for_target(att_db: u32) -> Self {
        if att_db <= 70 {
            Self::Db70
        } else if att_db <= 100 {
            Self::Db100
        } else {
            Self::Db140
        }
    }
}

/// Kaiser-window beta from a target stop-band attenuation, standard
/// Oppenheim & Schafer empirical formula.
fn kaiser_beta(att_db: f64) -> f64 {
    if att_db > 50.0 {
        0.1102 * (att_db - 8.7)
    } else if att_db >= 21.0 {
        0.5842 * (att_db - 21.0).powf(0.4) + 0.07886 * (att_db - 21.0)
    } else {
        0.0
    }
}

fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let half_x_sq = (x / 2.0) * (x / 2.0);
    for k in 1..=30 {
        term *= half_x_sq / (k as f64 * k as f64);
        sum += term;
        if term < 1e-16 * sum {
            break;
        }
    }
    sum
}

/// Generate an odd-length half-band low-pass FIR (cutoff at `fs/4`) windowed
/// by a Kaiser window tuned for `att_db` stop-band attenuation, matching the
/// structure of `HBF_70_11`/`HBF_70_39`: zero at every even tap offset from
/// center, `0.5` at the center tap.
fn half_band_coeffs(taps: usize, att_db: f64) -> Vec<f32> {
    assert!(taps % 4 == 3, "half-band filter length must be 4k+3");
    let m = (taps - 1) as isize;
    let beta = kaiser_beta(att_db);
    let i0_beta = bessel_i0(beta);

    let mut h = vec![0.0f64; taps];
    for (i, coeff) in h.iter_mut().enumerate() {
        let k = i as isize - m / 2;
        let sinc = if k == 0 {
            0.5
        } else if k % 2 == 0 {
            0.0
        } else {
            (std::f64::consts::PI * k as f64 / 2.0).sin() / (std::f64::consts::PI * k as f64)
        };
        let ratio = (i as f64 - m as f64 / 2.0) / (m as f64 / 2.0);
        let window = bessel_i0(beta * (1.0 - ratio * ratio).max(0.0).sqrt()) / i0_beta;
        *coeff = sinc * window;
    }

    let sum: f64 = h.iter().sum();
    h.iter().map(|&c| (c / sum) as f32).collect()
}

/// Single decimate-by-2 half-band FIR stage.
struct HalfBandStage {
    coeffs: Vec<f32>,
    state: Vec<Complex<f32>>,
}

impl HalfBandStage {
    fn new(taps: usize, att_db: f64) -> Self {
        Self {
            coeffs: half_band_coeffs(taps, att_db),
            state: vec![Complex::new(0.0, 0.0); taps - 1],
        }
    }

    fn firlen(&self) -> usize {
        self.coeffs.len()
    }

    /// Decimate `input` by 2, writing output samples into `out` (which is
    /// cleared first) and returning their count. `input.len()` must be at
    /// least `firlen()` and even.
    fn process(&mut self, input: &[Complex<f32>], out: &mut Vec<Complex<f32>>) -> usize {
        let firlen = self.firlen();
        if input.len() < firlen {
            out.clear();
            return 0;
        }

        let mut combined = Vec::with_capacity(self.state.len() + input.len());
        combined.extend_from_slice(&self.state);
        combined.extend_from_slice(input);

        out.clear();
        let n = input.len();
        let mut i = 0;
        while i < n {
            let mut acc = Complex::new(0.0, 0.0);
            for (k, &c) in self.coeffs.iter().enumerate() {
                acc += combined[i + k] * c;
            }
            out.push(acc);
            i += 2;
        }

        let tail_start = combined.len() - (firlen - 1);
        self.state.clear();
        self.state.extend_from_slice(&combined[tail_start..]);

        out.len()
    }
}

fn stage_tap_counts(mut decimation: u32, tier: AttenuationTier) -> Vec<usize> {
    let mut taps = Vec::new();
    while decimation >= 2 {
        let t = match tier {
            AttenuationTier::Db70 => {
                if decimation >= 4 {
                    11
                } else {
                    39
                }
            }
            AttenuationTier::Db100 => {
                if decimation >= 8 {
                    11
                } else if decimation == 4 {
                    19
                } else {
                    59
                }
            }
            AttenuationTier::Db140 => {
                if decimation >= 16 {
                    11
                } else if decimation == 8 {
                    15
                } else if decimation == 4 {
                    27
                } else {
                    87
                }
            }
        };
        taps.push(t);
        decimation /= 2;
    }
    taps
}

/// Cascade of half-band decimate-by-2 stages implementing an overall
/// decimation factor `D`, a power of 2 in `[2, 512]`.
pub struct DecimatorChain {
    stages: Vec<HalfBandStage>,
    scratch_a: Vec<Complex<f32>>,
    scratch_b: Vec<Complex<f32>>,
}

impl DecimatorChain {
    pub fn new(decimation: u32, att_db: u32) -> SdrResult<Self> {
        if decimation < 2 || decimation > MAX_DECIMATION || !decimation.is_power_of_two() {
            return Err(SdrError::invalid(format!(
                "decimation {decimation} must be a power of two in [2, {MAX_DECIMATION}]"
            )));
        }

        let tier = AttenuationTier::for_target(att_db);
        let stages = stage_tap_counts(decimation, tier)
            .into_iter()
            .map(|taps| HalfBandStage::new(taps, att_db as f64))
            .collect();

        Ok(Self {
            stages,
            scratch_a: Vec::new(),
            scratch_b: Vec::new(),
        })
    }

    pub fn decimation(&self) -> u32 {
        1 << self.stages.len()
    }

    /// Minimum number of input samples a single `process` call must be
    /// given, the first stage's `firlen`.
    pub fn min_input_len(&self) -> usize {
        self.stages.first().map(|s| s.firlen()).unwrap_or(1)
    }

    /// Decimate `input` through every stage, in place into `input`-backed
    /// storage; returns the number of output samples (`input.len() / D` in
    /// steady state).
    pub fn process(&mut self, input: &[Complex<f32>]) -> Vec<Complex<f32>> {
        if self.stages.is_empty() {
            return input.to_vec();
        }

        self.scratch_a.clear();
        self.scratch_a.extend_from_slice(input);

        for (idx, stage) in self.stages.iter_mut().enumerate() {
            let (src, dst) = if idx % 2 == 0 {
                (&self.scratch_a, &mut self.scratch_b)
            } else {
                (&self.scratch_b, &mut self.scratch_a)
            };
            stage.process(src, dst);
        }

        if self.stages.len() % 2 == 0 {
            self.scratch_a.clone()
        } else {
            self.scratch_b.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two_decimation() {
        assert!(DecimatorChain::new(3, 70).is_err());
    }

    #[test]
    fn rejects_decimation_out_of_range() {
        assert!(DecimatorChain::new(1024, 70).is_err());
    }

    #[test]
    fn stage_count_matches_log2_decimation() {
        let chain = DecimatorChain::new(8, 70).unwrap();
        assert_eq!(chain.decimation(), 8);
    }

    #[test]
    fn last_stage_gets_longest_kernel_in_each_tier() {
        assert_eq!(stage_tap_counts(4, AttenuationTier::Db70), vec![11, 39]);
        assert_eq!(
            stage_tap_counts(8, AttenuationTier::Db100),
            vec![11, 19, 59]
        );
        assert_eq!(
            stage_tap_counts(16, AttenuationTier::Db140),
            vec![11, 15, 27, 87]
        );
    }

    #[test]
    fn half_band_coeffs_match_known_structure() {
        let h = half_band_coeffs(11, 70.0);
        assert_eq!(h.len(), 11);
        assert!((h[5] - 0.5).abs() < 1e-6);
        for &even_offset in &[0usize, 2, 4, 6, 8, 10] {
            if even_offset != 5 {
                assert!(h[even_offset].abs() < 1e-6);
            }
        }
    }

    #[test]
    fn dc_passes_through_decimator_chain() {
        let mut chain = DecimatorChain::new(4, 70).unwrap();
        let input = vec![Complex::new(1.0, 0.0); 4096];
        let out = chain.process(&input);
        assert_eq!(out.len(), 1024);
        // Settle past the filter transient, then check DC gain is ~unity.
        let steady = &out[out.len() - 64..];
        for s in steady {
            assert!((s.re - 1.0).abs() < 0.05, "got {s:?}");
        }
    }

    #[test]
    fn process_halves_length_per_stage() {
        let mut chain = DecimatorChain::new(2, 70).unwrap();
        let input = vec![Complex::new(0.0, 0.0); 256];
        let out = chain.process(&input);
        assert_eq!(out.len(), 128);
    }
}
