// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Native sample format normalization: each vendor streams a different
//! wire format, all converted to complex floats in `[-1, 1]`.

use num_complex::Complex;

/// Native wire format produced by a vendor driver's RX callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Interleaved unsigned 8-bit I/Q, RTL-SDR's native format.
    U8,
    /// Interleaved signed 16-bit I/Q (Airspy Mini, SDR-IQ, LimeSDR).
    S16,
    /// Interleaved signed 12-bit I/Q packed into 16-bit words (BladeRF).
    S12,
    /// Interleaved 32-bit float I/Q, passed through unchanged (Airspy).
    F32,
    /// Interleaved unsigned 16-bit I/Q with a mid-scale offset (SDRplay).
    U16Offset,
}

impl SampleFormat {
    /// Number of wire bytes consumed per complex sample.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 => 2,
            SampleFormat::S16 | SampleFormat::S12 | SampleFormat::U16Offset => 4,
            SampleFormat::F32 => 8,
        }
    }

    /// Converts a raw byte buffer into normalized complex samples,
    /// appending to `out`. `raw` must hold a whole number of samples.
    pub fn decode(self, raw: &[u8], out: &mut Vec<Complex<f32>>) {
        let stride = self.bytes_per_sample();
        let n = raw.len() / stride;
        out.reserve(n);
        for i in 0..n {
            let chunk = &raw[i * stride..i * stride + stride];
            out.push(self.decode_one(chunk));
        }
    }

    fn decode_one(self, chunk: &[u8]) -> Complex<f32> {
        match self {
            SampleFormat::U8 => {
                let i = (chunk[0] as f32 - 127.4) / 127.5;
                let q = (chunk[1] as f32 - 127.4) / 127.5;
                Complex::new(i, q)
            }
            SampleFormat::S16 => {
                let i = i16::from_le_bytes([chunk[0], chunk[1]]) as f32 / 32768.0;
                let q = i16::from_le_bytes([chunk[2], chunk[3]]) as f32 / 32768.0;
                Complex::new(i, q)
            }
            SampleFormat::S12 => {
                // BladeRF ships 12-bit samples sign-extended into 16-bit words.
                let raw_i = i16::from_le_bytes([chunk[0], chunk[1]]);
                let raw_q = i16::from_le_bytes([chunk[2], chunk[3]]);
                Complex::new(raw_i as f32 / 2048.0, raw_q as f32 / 2048.0)
            }
            SampleFormat::F32 => {
                let i = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                let q = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
                Complex::new(i, q)
            }
            SampleFormat::U16Offset => {
                let raw_i = u16::from_le_bytes([chunk[0], chunk[1]]);
                let raw_q = u16::from_le_bytes([chunk[2], chunk[3]]);
                let i = (raw_i as f32 - 0.5) / 32767.5;
                let q = (raw_q as f32 - 0.5) / 32767.5;
                Complex::new(i, q)
            }
        }
    }
}
