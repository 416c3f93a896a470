// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Demodulators: AM envelope + DC-block, SSB real-part (+ optional BFO),
//! and a PLL-based NFM/APT discriminator. The AM/SSB shape follows
//! `trx-backend-soapysdr`'s `demod.rs`/`demod/{am,ssb}.rs`; the NFM/APT
//! discriminator is a PLL rather than that crate's cross-product `atan2`
//! approach, built from the natural-frequency/damping loop-filter gains
//! standard to second-order PLLs.

mod am;
mod nfm;
mod ssb;

use num_complex::Complex;
use sdrrx_core::DemodKind;

pub use am::AmDemodulator;
pub use nfm::NfmDemodulator;
pub use ssb::SsbDemodulator;

/// Single-pole DC-blocking IIR, `y[n] = x[n] - x[n-1] + r*y[n-1]`.
#[derive(Debug, Clone)]
pub struct DcBlocker {
    r: f32,
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    pub fn new(r: f32) -> Self {
        Self {
            r: r.clamp(0.0, 0.999_999),
            x1: 0.0,
            y1: 0.0,
        }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        let y = x - self.x1 + self.r * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }
}

/// Dispatching demodulator, one instance per channel, owned by the
/// [`crate::receiver::Receiver`].
pub enum Demodulator {
    None,
    Ssb(SsbDemodulator),
    Am(AmDemodulator),
    Fm(NfmDemodulator),
    Apt(NfmDemodulator),
}

impl Demodulator {
    pub fn for_kind(kind: DemodKind, sample_rate: f64, bandwidth: f64) -> Self {
        match kind {
            DemodKind::None => Self::None,
            DemodKind::Ssb => Self::Ssb(SsbDemodulator::new(sample_rate)),
            DemodKind::Am => Self::Am(AmDemodulator::new()),
            DemodKind::Fm => Self::Fm(NfmDemodulator::new(sample_rate, bandwidth, false)),
            DemodKind::Apt => Self::Apt(NfmDemodulator::new(sample_rate, bandwidth, true)),
        }
    }

    pub fn demodulate(&mut self, samples: &[Complex<f32>]) -> Vec<f32> {
        match self {
            Self::None => samples.iter().map(|s| s.re).collect(),
            Self::Ssb(d) => d.demodulate(samples),
            Self::Am(d) => d.demodulate(samples),
            Self::Fm(d) | Self::Apt(d) => d.demodulate(samples),
        }
    }
}
