// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod config;
pub mod error;
pub mod ring_buffer;

pub use config::{
    AgcParams, ChannelFilterParams, DemodKind, DeviceConfig, DeviceStats, DeviceStatus,
    FftSettings,
};
pub use error::{SdrError, SdrResult};
pub use ring_buffer::{ByteRingBuffer, ComplexRingBuffer, RingBuffer};

/// Complex baseband sample, `(re, im)` nominally in `[-1, 1]`.
pub type Sample = num_complex::Complex<f32>;
