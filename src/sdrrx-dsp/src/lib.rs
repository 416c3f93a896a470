// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Signal-processing chain for a single receive channel: NCO mixing,
//! half-band decimation, FFT overlap-save channel filtering, AGC,
//! demodulation, fractional resampling and the S-meter/squelch gate,
//! assembled by [`receiver::Receiver`].

pub mod agc;
pub mod channel_filter;
pub mod decimator;
pub mod demod;
pub mod fft;
pub mod nco;
pub mod receiver;
pub mod resampler;
pub mod smeter;

pub use agc::Agc;
pub use channel_filter::ChannelFilter;
pub use decimator::DecimatorChain;
pub use demod::Demodulator;
pub use fft::{FftEngine, FftMode};
pub use nco::Nco;
pub use receiver::{AudioFrame, Receiver};
pub use resampler::FractResampler;
pub use smeter::SMeter;
