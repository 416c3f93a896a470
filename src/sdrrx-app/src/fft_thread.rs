// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Cadence-driven spectrum producer: wakes roughly every millisecond, emits
//! a windowed forward FFT frame into a single-slot output latch at the
//! configured rate, and counts missed reads as underruns. Grounded on the
//! accumulate-then-latch shape of `SpectrumSnapshotter` in
//! `trx-backend-soapysdr/src/dsp.rs`, retargeted onto [`sdrrx_dsp::FftEngine`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use num_complex::Complex;
use sdrrx_core::{ComplexRingBuffer, SdrResult};
use sdrrx_dsp::{FftEngine, FftMode};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Default)]
struct OutputSlot {
    frame: Option<Vec<Complex<f32>>>,
    underruns: u64,
}

/// Owns the FFT engine and its output latch; runs on its own thread.
pub struct FftThread {
    input: Arc<Mutex<ComplexRingBuffer>>,
    output: Arc<Mutex<OutputSlot>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FftThread {
    /// Spawns the thread immediately. `fft_rate_hz` must be nonzero.
    pub fn start(fft_size: usize, fft_rate_hz: u32, input_capacity: usize) -> SdrResult<Self> {
        let engine = FftEngine::new(fft_size, FftMode::Spectrum)?;
        let period = Duration::from_millis(1000 / fft_rate_hz.max(1) as u64);

        let input = Arc::new(Mutex::new(ComplexRingBuffer::new(input_capacity.max(fft_size))));
        let output = Arc::new(Mutex::new(OutputSlot::default()));
        let running = Arc::new(AtomicBool::new(true));

        let thread_input = Arc::clone(&input);
        let thread_output = Arc::clone(&output);
        let thread_running = Arc::clone(&running);

        let handle = std::thread::spawn(move || {
            run_loop(engine, thread_input, thread_output, thread_running, period);
        });

        Ok(Self {
            input,
            output,
            running,
            handle: Some(handle),
        })
    }

    /// Tap for the pipeline thread: a copy of the samples it is about to
    /// demodulate, fed in before any per-channel DSP runs.
    pub fn add_input(&self, samples: &[Complex<f32>]) {
        if let Ok(mut guard) = self.input.lock() {
            guard.write(samples);
        }
    }

    /// A cloned handle to the input ring buffer, so a caller that doesn't
    /// own this `FftThread` (e.g. the pipeline thread) can still feed it.
    pub fn input_handle(&self) -> Arc<Mutex<ComplexRingBuffer>> {
        Arc::clone(&self.input)
    }

    /// Returns and clears the latched frame, if one is ready.
    pub fn get_output(&self) -> Option<Vec<Complex<f32>>> {
        self.output.lock().ok().and_then(|mut slot| slot.frame.take())
    }

    pub fn underruns(&self) -> u64 {
        self.output.lock().map(|slot| slot.underruns).unwrap_or(0)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FftThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    mut engine: FftEngine,
    input: Arc<Mutex<ComplexRingBuffer>>,
    output: Arc<Mutex<OutputSlot>>,
    running: Arc<AtomicBool>,
    period: Duration,
) {
    let fft_size = engine.size();
    let mut scratch = vec![Complex::new(0.0, 0.0); fft_size];
    let mut last_emit = Instant::now() - period;

    while running.load(Ordering::Relaxed) {
        std::thread::sleep(POLL_INTERVAL);
        if last_emit.elapsed() < period {
            continue;
        }

        let available = input.lock().map(|g| g.count()).unwrap_or(0);
        if available < fft_size {
            continue;
        }
        {
            let mut guard = match input.lock() {
                Ok(g) => g,
                Err(_) => continue,
            };
            guard.read(&mut scratch);
        }
        engine.feed(&scratch);
        let Some(frame) = engine.get_output() else {
            continue;
        };

        last_emit = Instant::now();
        if let Ok(mut slot) = output.lock() {
            if slot.frame.is_some() {
                slot.underruns += 1;
            }
            slot.frame = Some(frame);
        }
    }
}
