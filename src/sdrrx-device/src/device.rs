// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Device abstraction: a vendor-agnostic capability trait plus the
//! `{unloaded → loaded → open → running}` lifecycle shared by every
//! backend. Grounded on `trx-backend-soapysdr`'s `dsp::IqSource` trait
//! shape (`read_into`, `set_center_freq`), generalized to a fuller
//! capability set since each vendor here is dynamically loaded rather
//! than going through one unified SoapySDR device.

use num_complex::Complex;
use sdrrx_core::{DeviceStats, SdrResult};

/// Lifecycle state of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Unloaded,
    Loaded,
    Open,
    Running,
}

impl DeviceState {
    /// Every transition may fail; callers leave state untouched on `Err`.
    pub fn can_load(self) -> bool {
        self == DeviceState::Unloaded
    }
    pub fn can_open(self) -> bool {
        self == DeviceState::Loaded
    }
    pub fn can_start(self) -> bool {
        self == DeviceState::Open
    }
    pub fn can_stop(self) -> bool {
        self == DeviceState::Running
    }
    pub fn can_close(self) -> bool {
        self == DeviceState::Open || self == DeviceState::Running
    }
}

/// Gain control mode, mirroring `sdr_input/gain_mode` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainMode {
    Auto,
    Manual,
}

impl GainMode {
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            GainMode::Auto
        } else {
            GainMode::Manual
        }
    }
}

/// Uniform contract every vendor backend implements.
pub trait IqDevice: Send {
    fn type_id(&self) -> &'static str;

    fn load_driver(&mut self) -> SdrResult<()>;
    fn open(&mut self) -> SdrResult<()>;
    fn close(&mut self) -> SdrResult<()>;
    fn start_rx(&mut self) -> SdrResult<()>;
    fn stop_rx(&mut self) -> SdrResult<()>;

    /// All-or-nothing: returns 0 if fewer than `out.len()` samples are
    /// currently buffered, otherwise fills `out` completely and returns
    /// its length.
    fn read_samples(&mut self, out: &mut [Complex<f32>]) -> SdrResult<usize>;

    fn set_rx_frequency(&mut self, hz: u64) -> SdrResult<()>;
    fn set_rx_sample_rate(&mut self, sps: u32) -> SdrResult<()>;
    fn set_rx_bandwidth(&mut self, hz: u32) -> SdrResult<()>;
    fn set_rx_gain(&mut self, mode: GainMode, gain: u32) -> SdrResult<()>;

    fn get_supported_rates(&self) -> Vec<u32>;
    fn get_frequency_range(&self) -> (u64, u64);

    fn state(&self) -> DeviceState;

    /// Samples currently available to `read_samples` without blocking.
    fn available_samples(&self) -> usize;

    /// Traffic counters since the last `start_rx`: samples produced into
    /// the ring buffer and samples dropped because the ring was already
    /// full when the producer wrote to it.
    fn stats(&self) -> DeviceStats;

    /// Whether this backend can apply PPM-style frequency correction in
    /// hardware. Backends that can't (the default, and every backend here
    /// today) get the correction folded into the tuned frequency instead,
    /// via `DeviceConfig::corrected_frequency`.
    fn has_native_freq_correction(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_transitions_are_gated_by_lifecycle_position() {
        assert!(DeviceState::Unloaded.can_load());
        assert!(!DeviceState::Unloaded.can_open());
        assert!(DeviceState::Loaded.can_open());
        assert!(DeviceState::Open.can_start());
        assert!(DeviceState::Running.can_stop());
        assert!(DeviceState::Open.can_close());
        assert!(DeviceState::Running.can_close());
        assert!(!DeviceState::Loaded.can_close());
    }

    #[test]
    fn gain_mode_zero_is_auto() {
        assert_eq!(GainMode::from_code(0), GainMode::Auto);
        assert_eq!(GainMode::from_code(1), GainMode::Manual);
    }
}
