// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The pipeline owner: opens the device, builds the Receiver and the FFT
//! thread, and runs the capture→DSP→audio loop on a dedicated thread.
//! Grounded on `SdrPipeline::start`'s read-loop shape in
//! `trx-backend-soapysdr/src/dsp.rs`, retargeted from its `tokio::spawn`
//! async task onto a plain `std::thread`, and from its
//! `Arc<Mutex<Option<f64>>>` command cells onto direct mutex-guarded setters
//! since there is no async runtime here to poll them from.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use num_complex::Complex;
use tracing::{error, info, warn};

use sdrrx_core::{AgcParams, ChannelFilterParams, DemodKind, DeviceConfig, SdrError, SdrResult};
use sdrrx_device::{backend, DeviceState, GainMode, IqDevice};
use sdrrx_dsp::{AudioFrame, Receiver};

use crate::fft_thread::FftThread;

/// A sink for the demodulated PCM stream; the wire contract is just a raw
/// byte stream, so any [`std::io::Write`] qualifies.
pub trait AudioSink: Send {
    fn write_samples(&mut self, pcm: &[i16]);
}

/// Adapts any [`Write`] into an [`AudioSink`] by serializing as little-endian
/// 16-bit PCM.
pub struct WriterSink<W> {
    inner: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write + Send> AudioSink for WriterSink<W> {
    fn write_samples(&mut self, pcm: &[i16]) {
        let mut bytes = Vec::with_capacity(pcm.len() * 2);
        for &s in pcm {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        if let Err(e) = self.inner.write_all(&bytes) {
            warn!("audio sink write failed: {e}");
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerStats {
    pub samples_in: u64,
    pub samples_out: u64,
}

/// Everything needed to bring up one receive chain, the in-memory analogue
/// of `[sdr_input]` plus its demod/channel/AGC sub-tables.
pub struct PipelineConfig {
    pub device: DeviceConfig,
    pub channel: ChannelFilterParams,
    pub agc: AgcParams,
    pub demod: DemodKind,
    pub squelch_db: f64,
    pub output_rate: u32,
    pub dynamic_range_db: u32,
    pub fft_size: usize,
    pub fft_rate_hz: u32,
}

const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(10);
const UNDERFULL_SLEEP: Duration = Duration::from_millis(2);

/// Owns the device, the Receiver, and the FFT thread; runs the capture loop
/// on its own thread once [`Scheduler::start`] returns.
pub struct Scheduler {
    device: Arc<Mutex<Box<dyn IqDevice>>>,
    receiver: Arc<Mutex<Receiver>>,
    fft_thread: Option<FftThread>,
    running: Arc<AtomicBool>,
    pipeline_handle: Option<JoinHandle<()>>,
    stats: Arc<Mutex<SchedulerStats>>,
}

/// Smallest number of raw input samples per iteration that, after the
/// Receiver's internal decimation, yields a 20 ms block at the quadrature
/// rate. Since `quad_rate = input_rate / quad_decim`,
/// `20ms * quad_rate * quad_decim == 20ms * input_rate` regardless of the
/// actual decimation factor chosen.
fn samples_per_iteration(input_rate: u32) -> usize {
    let n = ((input_rate as f64) * 0.020).round() as usize;
    (n + (n % 2)).max(2)
}

impl Scheduler {
    pub fn start(
        config: PipelineConfig,
        device_type: &str,
        sink: Box<dyn AudioSink>,
    ) -> SdrResult<Self> {
        let mut device = backend::create(device_type)?;
        device.load_driver()?;
        device.open()?;

        if let Err(e) = device.set_rx_sample_rate(config.device.rate) {
            warn!("backend rejected sample rate override: {e}");
        }
        if config.device.bandwidth > 0 {
            if let Err(e) = device.set_rx_bandwidth(config.device.bandwidth) {
                warn!("backend rejected bandwidth override: {e}");
            }
        }
        if let Err(e) = device.set_rx_gain(GainMode::from_code(config.device.gain_mode), config.device.gain) {
            warn!("backend rejected gain override: {e}");
        }
        let base_hw_freq = config.device.hardware_frequency();
        let hw_freq = if device.has_native_freq_correction() {
            base_hw_freq
        } else {
            config.device.corrected_frequency(base_hw_freq)
        };
        if let Err(e) = device.set_rx_frequency(hw_freq) {
            warn!("backend rejected frequency override: {e}");
        }

        let needed = samples_per_iteration(config.device.rate);

        let mut receiver = Receiver::init(
            config.device.rate,
            config.output_rate,
            config.dynamic_range_db,
            config.demod,
            config.channel,
            config.agc,
            config.squelch_db,
        )?;
        receiver.set_tuning_offset(config.device.nco as f64);

        let fft_thread = FftThread::start(config.fft_size, config.fft_rate_hz, needed * 4)?;

        device.start_rx()?;
        info!(
            device = device_type,
            rate = config.device.rate,
            frequency = hw_freq,
            "device streaming"
        );

        let running = Arc::new(AtomicBool::new(true));
        let device = Arc::new(Mutex::new(device));
        let receiver = Arc::new(Mutex::new(receiver));
        let stats = Arc::new(Mutex::new(SchedulerStats::default()));

        let handle = spawn_pipeline_thread(
            Arc::clone(&device),
            Arc::clone(&receiver),
            FftTap(fft_thread.input_handle()),
            Arc::clone(&running),
            Arc::clone(&stats),
            sink,
            needed,
        );

        Ok(Self {
            device,
            receiver,
            fft_thread: Some(fft_thread),
            running,
            pipeline_handle: Some(handle),
            stats,
        })
    }

    /// Requests interruption and joins within a bounded 10 s timeout; a
    /// pipeline that does not stop in time is a detected fault, logged but
    /// not forcibly killed.
    pub fn stop(&mut self) -> SdrResult<()> {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.pipeline_handle.take() {
            let deadline = Instant::now() + STOP_JOIN_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(20));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                error!("pipeline thread did not stop within the 10s timeout");
            }
        }

        if let Some(mut fft) = self.fft_thread.take() {
            fft.stop();
        }

        {
            let mut device = self
                .device
                .lock()
                .map_err(|_| SdrError::other("device mutex poisoned"))?;
            if device.state() == DeviceState::Running {
                device.stop_rx()?;
            }
            device.close()?;
        }

        let stats = self.stats();
        let elapsed_note = if stats.samples_in > 0 {
            format!(
                "in={} out={} ratio={:.3}",
                stats.samples_in,
                stats.samples_out,
                stats.samples_out as f64 / stats.samples_in as f64
            )
        } else {
            "no samples captured".to_string()
        };
        info!("pipeline stopped: {elapsed_note}");
        Ok(())
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }

    /// The device's own traffic counters, independent of how much the
    /// pipeline thread has managed to drain.
    pub fn device_stats(&self) -> sdrrx_core::DeviceStats {
        self.device.lock().map(|d| d.stats()).unwrap_or_default()
    }

    // --- Hot-settable controls ---

    pub fn set_frequency(&self, hz: u64) -> SdrResult<()> {
        self.device.lock().unwrap().set_rx_frequency(hz)
    }

    pub fn set_tuning_offset(&self, hz: f64) {
        self.receiver.lock().unwrap().set_tuning_offset(hz);
    }

    pub fn set_gain(&self, mode: GainMode, gain: u32) -> SdrResult<()> {
        self.device.lock().unwrap().set_rx_gain(mode, gain)
    }

    pub fn set_demod_kind(&self, kind: DemodKind) {
        self.receiver.lock().unwrap().set_demod_kind(kind);
    }

    pub fn reconfigure_channel(&self, params: ChannelFilterParams) -> SdrResult<()> {
        self.receiver.lock().unwrap().reconfigure_channel(params)
    }

    pub fn reconfigure_agc(&self, params: AgcParams) {
        self.receiver.lock().unwrap().reconfigure_agc(params);
    }

    /// Returns and clears the FFT thread's latched spectrum frame, if one is
    /// ready, exposed at the scheduler level for a UI thread to poll on a
    /// timer.
    pub fn get_fft_output(&self) -> Option<Vec<Complex<f32>>> {
        self.fft_thread.as_ref().and_then(|f| f.get_output())
    }

    pub fn fft_underruns(&self) -> u64 {
        self.fft_thread.as_ref().map(|f| f.underruns()).unwrap_or(0)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if self.pipeline_handle.is_some() {
            let _ = self.stop();
        }
    }
}

/// Exponential read-error backoff, doubling per consecutive failure up to a
/// 250ms ceiling.
fn read_error_backoff_ms(streak: u32) -> u64 {
    (10u128)
        .saturating_mul(1u128 << streak.saturating_sub(1).min(4))
        .min(250) as u64
}

#[allow(clippy::too_many_arguments)]
fn spawn_pipeline_thread(
    device: Arc<Mutex<Box<dyn IqDevice>>>,
    receiver: Arc<Mutex<Receiver>>,
    fft_tap: FftTap,
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<SchedulerStats>>,
    mut sink: Box<dyn AudioSink>,
    needed: usize,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut in_buf = vec![Complex::new(0.0, 0.0); needed];
        let mut audio = Vec::new();
        let mut read_error_streak: u32 = 0;

        while running.load(Ordering::Relaxed) {
            let available = device.lock().map(|d| d.available_samples()).unwrap_or(0);
            if available < needed {
                std::thread::sleep(UNDERFULL_SLEEP);
                continue;
            }

            let n = match device.lock() {
                Ok(mut d) => match d.read_samples(&mut in_buf) {
                    Ok(n) => {
                        read_error_streak = 0;
                        n
                    }
                    Err(e) => {
                        read_error_streak = read_error_streak.saturating_add(1);
                        let sleep_ms = read_error_backoff_ms(read_error_streak);
                        warn!(
                            "device read failed: {e}; retrying (streak={read_error_streak}, sleep={sleep_ms}ms)"
                        );
                        if read_error_streak >= 10 {
                            error!("device read failing repeatedly, assuming device lost");
                        }
                        std::thread::sleep(Duration::from_millis(sleep_ms));
                        continue;
                    }
                },
                Err(_) => {
                    error!("device mutex poisoned, stopping pipeline");
                    break;
                }
            };
            if n == 0 {
                std::thread::sleep(UNDERFULL_SLEEP);
                continue;
            }

            if let Ok(mut s) = stats.lock() {
                s.samples_in += n as u64;
            }

            fft_tap.add_input(&in_buf[..n]);

            let frame = match receiver.lock() {
                Ok(mut rx) => rx.process(&mut in_buf[..n], &mut audio),
                Err(_) => {
                    error!("receiver mutex poisoned, stopping pipeline");
                    break;
                }
            };

            if let AudioFrame::Samples(m) = frame {
                if m > 0 {
                    sink.write_samples(&audio[..m]);
                    if let Ok(mut s) = stats.lock() {
                        s.samples_out += m as u64;
                    }
                }
            }
        }
    })
}

/// Cloneable handle into the FFT thread's input side, so the pipeline
/// thread can tap samples without owning the [`FftThread`] itself.
struct FftTap(Arc<Mutex<sdrrx_core::ComplexRingBuffer>>);

impl FftTap {
    fn add_input(&self, samples: &[Complex<f32>]) {
        if let Ok(mut guard) = self.0.lock() {
            guard.write(samples);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_backoff_doubles_then_caps_at_250ms() {
        assert_eq!(read_error_backoff_ms(1), 10);
        assert_eq!(read_error_backoff_ms(2), 20);
        assert_eq!(read_error_backoff_ms(3), 40);
        assert_eq!(read_error_backoff_ms(5), 160);
        assert_eq!(read_error_backoff_ms(6), 250);
        assert_eq!(read_error_backoff_ms(50), 250);
    }

    #[test]
    fn samples_per_iteration_is_even_and_covers_20ms() {
        assert_eq!(samples_per_iteration(2_400_000), 48_000);
        assert_eq!(samples_per_iteration(192_000), 3_840);
        assert_eq!(samples_per_iteration(48_000) % 2, 0);
    }

    struct VecSink(Vec<i16>);
    impl AudioSink for VecSink {
        fn write_samples(&mut self, pcm: &[i16]) {
            self.0.extend_from_slice(pcm);
        }
    }

    #[test]
    fn writer_sink_serializes_little_endian() {
        let mut buf = Vec::new();
        {
            let mut sink = WriterSink::new(&mut buf);
            sink.write_samples(&[1, -1]);
        }
        assert_eq!(buf, vec![1, 0, 255, 255]);
    }
}
