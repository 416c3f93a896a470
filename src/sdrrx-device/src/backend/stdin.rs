// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Raw I/Q-over-stdin source, the `sdr_input/type = stdin` backend: reads
//! interleaved signed 16-bit I/Q directly from the process's standard
//! input, for piping in a capture from an external tool.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use num_complex::Complex;
use sdrrx_core::{ComplexRingBuffer, DeviceStats, SdrError, SdrResult};

use crate::device::{DeviceState, GainMode, IqDevice};
use crate::format::SampleFormat;

const RING_BUFFER_SECONDS: f64 = 0.5;
const DEFAULT_RATE: u32 = 48_000;

pub struct StdinDevice {
    state: DeviceState,
    sample_rate: u32,
    ring: Arc<Mutex<ComplexRingBuffer>>,
    stop_flag: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
    stats: Arc<Mutex<DeviceStats>>,
}

impl StdinDevice {
    pub fn new() -> Self {
        Self {
            state: DeviceState::Unloaded,
            sample_rate: DEFAULT_RATE,
            ring: Arc::new(Mutex::new(ComplexRingBuffer::new(
                ((DEFAULT_RATE as f64) * RING_BUFFER_SECONDS) as usize,
            ))),
            stop_flag: Arc::new(AtomicBool::new(false)),
            producer: None,
            stats: Arc::new(Mutex::new(DeviceStats::default())),
        }
    }
}

impl Default for StdinDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl IqDevice for StdinDevice {
    fn type_id(&self) -> &'static str {
        "stdin"
    }

    fn load_driver(&mut self) -> SdrResult<()> {
        if !self.state.can_load() {
            return Err(SdrError::busy("already loaded"));
        }
        self.state = DeviceState::Loaded;
        Ok(())
    }

    fn open(&mut self) -> SdrResult<()> {
        if !self.state.can_open() {
            return Err(SdrError::busy("not loaded"));
        }
        self.state = DeviceState::Open;
        Ok(())
    }

    fn close(&mut self) -> SdrResult<()> {
        if !self.state.can_close() {
            return Err(SdrError::busy("not open"));
        }
        if self.state == DeviceState::Running {
            self.stop_rx()?;
        }
        self.state = DeviceState::Loaded;
        Ok(())
    }

    fn start_rx(&mut self) -> SdrResult<()> {
        if !self.state.can_start() {
            return Err(SdrError::busy("not open"));
        }
        self.stop_flag.store(false, Ordering::SeqCst);
        if let Ok(mut s) = self.stats.lock() {
            *s = DeviceStats::default();
        }
        let stop_flag = Arc::clone(&self.stop_flag);
        let ring = Arc::clone(&self.ring);
        let stats = Arc::clone(&self.stats);

        self.producer = Some(std::thread::spawn(move || {
            let mut stdin = std::io::stdin().lock();
            let mut raw = [0u8; 16384];
            let mut decoded = Vec::new();
            while !stop_flag.load(Ordering::Relaxed) {
                match stdin.read(&mut raw) {
                    Ok(0) => return,
                    Ok(n) => {
                        decoded.clear();
                        SampleFormat::S16.decode(&raw[..n], &mut decoded);
                        if let Ok(mut guard) = ring.lock() {
                            let room = guard.size() - guard.count();
                            let dropped = decoded.len().saturating_sub(room);
                            guard.write(&decoded);
                            if let Ok(mut s) = stats.lock() {
                                s.rx_samples += decoded.len() as u64;
                                s.rx_overruns += dropped as u64;
                            }
                        }
                    }
                    Err(_) => return,
                }
            }
        }));

        self.state = DeviceState::Running;
        Ok(())
    }

    fn stop_rx(&mut self) -> SdrResult<()> {
        if !self.state.can_stop() {
            return Err(SdrError::busy("not running"));
        }
        self.stop_flag.store(true, Ordering::SeqCst);
        // stdin.read() may still be blocked; the thread is detached rather
        // than joined so `stop` does not hang waiting on an EOF that may
        // never come.
        self.producer = None;
        self.state = DeviceState::Open;
        Ok(())
    }

    fn read_samples(&mut self, out: &mut [Complex<f32>]) -> SdrResult<usize> {
        let mut guard = self
            .ring
            .lock()
            .map_err(|_| SdrError::other("ring buffer lock poisoned"))?;
        if guard.count() < out.len() {
            return Ok(0);
        }
        Ok(guard.read(out))
    }

    fn set_rx_frequency(&mut self, _hz: u64) -> SdrResult<()> {
        Err(SdrError::not_avail("stdin backend has no tunable frequency"))
    }

    fn set_rx_sample_rate(&mut self, sps: u32) -> SdrResult<()> {
        self.sample_rate = sps;
        if let Ok(mut guard) = self.ring.lock() {
            guard.resize(((sps as f64) * RING_BUFFER_SECONDS).ceil() as usize);
        }
        Ok(())
    }

    fn set_rx_bandwidth(&mut self, _hz: u32) -> SdrResult<()> {
        Err(SdrError::not_avail("stdin backend has no adjustable bandwidth"))
    }

    fn set_rx_gain(&mut self, _mode: GainMode, _gain: u32) -> SdrResult<()> {
        Err(SdrError::not_avail("stdin backend has no gain control"))
    }

    fn get_supported_rates(&self) -> Vec<u32> {
        vec![self.sample_rate]
    }

    fn get_frequency_range(&self) -> (u64, u64) {
        (0, 0)
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn available_samples(&self) -> usize {
        self.ring.lock().map(|g| g.count()).unwrap_or(0)
    }

    fn stats(&self) -> DeviceStats {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_advances_through_states() {
        let mut device = StdinDevice::new();
        assert_eq!(device.state(), DeviceState::Unloaded);
        device.load_driver().unwrap();
        assert_eq!(device.state(), DeviceState::Loaded);
        device.open().unwrap();
        assert_eq!(device.state(), DeviceState::Open);
    }

    #[test]
    fn sample_rate_is_settable_before_start() {
        let mut device = StdinDevice::new();
        device.set_rx_sample_rate(192_000).unwrap();
        assert_eq!(device.get_supported_rates(), vec![192_000]);
    }
}
