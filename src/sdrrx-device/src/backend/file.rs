// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! File-backed capture source: a seekable stereo I/Q WAV read with `hound`,
//! for offline playback of a prior capture. No vendor library is needed;
//! samples are decoded by a background thread into the shared ring buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use hound::WavReader;
use num_complex::Complex;
use sdrrx_core::{ComplexRingBuffer, DeviceStats, SdrError, SdrResult};

use crate::device::{DeviceState, GainMode, IqDevice};

const RING_BUFFER_SECONDS: f64 = 0.5;
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct FileDevice {
    path: String,
    state: DeviceState,
    sample_rate: u32,
    ring: Arc<Mutex<ComplexRingBuffer>>,
    stop_flag: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
    stats: Arc<Mutex<DeviceStats>>,
}

impl FileDevice {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            state: DeviceState::Unloaded,
            sample_rate: 48_000,
            ring: Arc::new(Mutex::new(ComplexRingBuffer::new(24_000))),
            stop_flag: Arc::new(AtomicBool::new(false)),
            producer: None,
            stats: Arc::new(Mutex::new(DeviceStats::default())),
        }
    }
}

impl IqDevice for FileDevice {
    fn type_id(&self) -> &'static str {
        "file"
    }

    fn load_driver(&mut self) -> SdrResult<()> {
        if !self.state.can_load() {
            return Err(SdrError::busy("already loaded"));
        }
        if !std::path::Path::new(&self.path).exists() {
            return Err(SdrError::not_found(format!("no such file: {}", self.path)));
        }
        self.state = DeviceState::Loaded;
        Ok(())
    }

    fn open(&mut self) -> SdrResult<()> {
        if !self.state.can_open() {
            return Err(SdrError::busy("not loaded"));
        }
        let reader = WavReader::open(&self.path)
            .map_err(|e| SdrError::open(format!("failed to open {}: {e}", self.path)))?;
        let spec = reader.spec();
        if spec.channels != 2 {
            return Err(SdrError::invalid("I/Q WAV must have exactly 2 channels"));
        }
        self.sample_rate = spec.sample_rate;
        let capacity = ((self.sample_rate as f64) * RING_BUFFER_SECONDS).ceil() as usize;
        if let Ok(mut guard) = self.ring.lock() {
            guard.resize(capacity);
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
        let path = self.path.clone();

        self.producer = Some(std::thread::spawn(move || {
            let mut reader = match WavReader::open(&path) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("file producer failed to reopen {}: {}", path, e);
                    return;
                }
            };
            let max_val = i16::MAX as f32 + 1.0;
            let mut samples = reader.samples::<i16>();
            let mut batch = Vec::with_capacity(4096);

            loop {
                if stop_flag.load(Ordering::Relaxed) {
                    return;
                }
                batch.clear();
                for _ in 0..4096 {
                    if stop_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    let i = match samples.next() {
                        Some(Ok(v)) => v,
                        _ => {
                            // End of file: idle rather than reopen/loop, this
                            // is a finite capture fixture, not a live stream.
                            std::thread::sleep(Duration::from_millis(2));
                            continue;
                        }
                    };
                    let q = match samples.next() {
                        Some(Ok(v)) => v,
                        _ => break,
                    };
                    batch.push(Complex::new(i as f32 / max_val, q as f32 / max_val));
                }
                if batch.is_empty() {
                    continue;
                }
                if let Ok(mut guard) = ring.lock() {
                    let room = guard.size() - guard.count();
                    let dropped = batch.len().saturating_sub(room);
                    guard.write(&batch);
                    if let Ok(mut s) = stats.lock() {
                        s.rx_samples += batch.len() as u64;
                        s.rx_overruns += dropped as u64;
                    }
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
        if let Some(handle) = std::mem::take(&mut self.producer) {
            let deadline = Instant::now() + STOP_JOIN_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(20));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                tracing::error!("file device producer thread did not stop within the 10s timeout");
            }
        }
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
        Err(SdrError::not_avail("file backend has no tunable frequency"))
    }

    fn set_rx_sample_rate(&mut self, _sps: u32) -> SdrResult<()> {
        Err(SdrError::not_avail("file backend sample rate is fixed by the capture"))
    }

    fn set_rx_bandwidth(&mut self, _hz: u32) -> SdrResult<()> {
        Err(SdrError::not_avail("file backend has no adjustable bandwidth"))
    }

    fn set_rx_gain(&mut self, _mode: GainMode, _gain: u32) -> SdrResult<()> {
        Err(SdrError::not_avail("file backend has no gain control"))
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
    fn missing_file_fails_at_load_time() {
        let mut device = FileDevice::new("/nonexistent/path/for/test.wav");
        assert!(matches!(device.load_driver(), Err(SdrError::NotFound(_))));
    }

    #[test]
    fn frequency_is_not_available_on_file_backend() {
        let mut device = FileDevice::new("/nonexistent/path/for/test.wav");
        assert!(device.set_rx_frequency(14_200_000).is_err());
    }
}
