// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Data model shared by every layer: device configuration, lifecycle status,
//! traffic counters and the per-channel DSP parameters.

use serde::{Deserialize, Serialize};

/// Persisted, per-device tuning and capture configuration.
///
/// Loaded before device creation and read-only for the duration of a run;
/// changing it requires the stop → reconfigure → start sequence described by
/// [`crate::config::ColdParam`] unless the field is hot-applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Backend type id, e.g. `"rtlsdr"`, `"airspy"`, `"file"`.
    pub device_type: String,
    /// Tuned frequency in Hz, as seen by the user (before transverter offset).
    pub frequency: u64,
    /// Software tuning offset inside the captured band, in Hz.
    pub nco: i64,
    /// Front-end frequency offset; the hardware is programmed at
    /// `frequency - transverter`.
    pub transverter: i64,
    /// Capture sample rate in samples per second.
    #[serde(rename = "sample_rate")]
    pub rate: u32,
    /// Decimation factor, a power of 2 ≥ 1.
    pub decimation: u32,
    /// Input bandwidth in Hz; 0 means "let the backend choose".
    pub bandwidth: u32,
    /// Frequency correction in parts per billion.
    #[serde(rename = "frequency_correction")]
    pub freq_corr_ppb: i32,
    /// Backend-defined gain mode (e.g. manual vs. AGC-on-tuner).
    pub gain_mode: i32,
    /// Gain setting, 0-100.
    pub gain: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: "file".to_string(),
            frequency: 100_000_000,
            nco: 0,
            transverter: 0,
            rate: 2_048_000,
            decimation: 1,
            bandwidth: 0,
            freq_corr_ppb: 0,
            gain_mode: 0,
            gain: 0,
        }
    }
}

impl DeviceConfig {
    /// Frequency the hardware tuner is actually programmed to, after
    /// subtracting the transverter offset.
    #[must_use]
    pub fn hardware_frequency(&self) -> u64 {
        (self.frequency as i64 - self.transverter).max(0) as u64
    }

    /// Frequency adjusted by `freq_corr_ppb`, for backends without a native
    /// PPM correction call.
    #[must_use]
    pub fn corrected_frequency(&self, hz: u64) -> u64 {
        let delta = (hz as f64) * (self.freq_corr_ppb as f64) / 1.0e9;
        (hz as i64 + delta.round() as i64).max(0) as u64
    }
}

/// Lifecycle status of a device, monotone within one `open`..`close` cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub driver_loaded: bool,
    pub device_open: bool,
    pub rx_running: bool,
}

/// Traffic counters, reset on stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStats {
    pub rx_samples: u64,
    pub rx_overruns: u64,
}

/// Demodulator selection. CW is represented as SSB plus a nonzero `cw_offset`
/// in [`ChannelFilterParams`], not a separate variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemodKind {
    None,
    Ssb,
    Am,
    Fm,
    /// Wide-NFM weather-satellite variant: same discriminator, wider PLL
    /// capture range (30 kHz vs. 10 kHz).
    Apt,
}

impl Default for DemodKind {
    fn default() -> Self {
        Self::None
    }
}

/// Channel bandpass parameters for the fast FIR filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelFilterParams {
    pub low_cut: f64,
    pub high_cut: f64,
    pub cw_offset: f64,
    pub sample_rate: f64,
}

impl ChannelFilterParams {
    /// Validates `low_cut < high_cut` and both within `(-fs/2, fs/2)`.
    pub fn validate(&self) -> crate::error::SdrResult<()> {
        let nyquist = self.sample_rate / 2.0;
        if self.low_cut >= self.high_cut {
            return Err(crate::error::SdrError::invalid(format!(
                "low_cut {} must be < high_cut {}",
                self.low_cut, self.high_cut
            )));
        }
        if self.low_cut <= -nyquist || self.high_cut >= nyquist {
            return Err(crate::error::SdrError::invalid(format!(
                "cutoffs [{}, {}] must lie within (-{nyquist}, {nyquist})",
                self.low_cut, self.high_cut
            )));
        }
        Ok(())
    }
}

/// AGC configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgcParams {
    pub on: bool,
    pub use_hang: bool,
    pub threshold_db: f64,
    pub manual_gain_db: f64,
    pub slope_db: f64,
    pub decay_ms: f64,
    pub sample_rate: f64,
}

impl Default for AgcParams {
    fn default() -> Self {
        Self {
            on: true,
            use_hang: false,
            threshold_db: -100.0,
            manual_gain_db: 0.0,
            slope_db: 0.0,
            decay_ms: 500.0,
            sample_rate: 48_000.0,
        }
    }
}

/// Spectrum/FFT thread configuration. `size` is fixed after init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FftSettings {
    pub size: usize,
    pub rate_hz: u32,
}

impl FftSettings {
    pub const MIN_SIZE: usize = 512;
    pub const MAX_SIZE: usize = 65536;

    pub fn validate(&self) -> crate::error::SdrResult<()> {
        if !(Self::MIN_SIZE..=Self::MAX_SIZE).contains(&self.size) || !self.size.is_power_of_two()
        {
            return Err(crate::error::SdrError::invalid(format!(
                "fft size {} must be a power of two in [{}, {}]",
                self.size,
                Self::MIN_SIZE,
                Self::MAX_SIZE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_frequency_subtracts_transverter() {
        let cfg = DeviceConfig {
            frequency: 144_200_000,
            transverter: 100_000_000,
            ..Default::default()
        };
        assert_eq!(cfg.hardware_frequency(), 44_200_000);
    }

    #[test]
    fn corrected_frequency_applies_ppb_scale() {
        let cfg = DeviceConfig {
            freq_corr_ppb: 10,
            ..Default::default()
        };
        // 100 MHz * 10ppb = 1 Hz.
        assert_eq!(cfg.corrected_frequency(100_000_000), 100_000_001);
    }

    #[test]
    fn channel_filter_rejects_crossed_cutoffs() {
        let params = ChannelFilterParams {
            low_cut: 1000.0,
            high_cut: 500.0,
            cw_offset: 0.0,
            sample_rate: 48_000.0,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn channel_filter_rejects_cutoff_beyond_nyquist() {
        let params = ChannelFilterParams {
            low_cut: -30_000.0,
            high_cut: 30_000.0,
            cw_offset: 0.0,
            sample_rate: 48_000.0,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn fft_settings_require_power_of_two() {
        let bad = FftSettings {
            size: 1000,
            rate_hz: 10,
        };
        assert!(bad.validate().is_err());
        let good = FftSettings {
            size: 1024,
            rate_hz: 10,
        };
        assert!(good.validate().is_ok());
    }
}
