// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! End-to-end file-backend scenario: an offline I/Q WAV capture with a
//! carrier at +500 Hz relative to the tuned center, demodulated as USB,
//! should produce an audio tone at 500 Hz.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};
use sdrrx_app::{AudioSink, PipelineConfig, Scheduler};
use sdrrx_core::{AgcParams, ChannelFilterParams, DemodKind, DeviceConfig};

struct SharedSink(Arc<Mutex<Vec<i16>>>);

impl AudioSink for SharedSink {
    fn write_samples(&mut self, pcm: &[i16]) {
        self.0.lock().unwrap().extend_from_slice(pcm);
    }
}

fn goertzel_power(samples: &[f32], target_hz: f64, sample_rate: f64) -> f64 {
    let n = samples.len() as f64;
    let k = (0.5 + n * target_hz / sample_rate).floor();
    let omega = 2.0 * std::f64::consts::PI * k / n;
    let coeff = 2.0 * omega.cos();
    let (mut s1, mut s2) = (0.0, 0.0);
    for &x in samples {
        let s0 = x as f64 + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    s1 * s1 + s2 * s2 - coeff * s1 * s2
}

fn write_carrier_wav(path: &PathBuf, sample_rate: u32, carrier_hz: f64, seconds: f64) {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    let n = (sample_rate as f64 * seconds) as usize;
    let amplitude = 0.3 * i16::MAX as f64;
    for i in 0..n {
        let theta = 2.0 * std::f64::consts::PI * carrier_hz * i as f64 / sample_rate as f64;
        writer.write_sample((theta.cos() * amplitude) as i16).unwrap();
        writer.write_sample((theta.sin() * amplitude) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn ssb_demod_recovers_tone_at_carrier_offset() {
    let sample_rate = 48_000u32;
    let path = std::env::temp_dir().join(format!("sdrrx-ssb-fixture-{}.wav", std::process::id()));
    write_carrier_wav(&path, sample_rate, 500.0, 2.0);

    let device = DeviceConfig {
        device_type: "file".to_string(),
        frequency: 0,
        nco: 0,
        transverter: 0,
        rate: sample_rate,
        decimation: 1,
        bandwidth: 0,
        freq_corr_ppb: 0,
        gain_mode: 0,
        gain: 0,
    };
    let channel = ChannelFilterParams {
        low_cut: 100.0,
        high_cut: 2800.0,
        cw_offset: 0.0,
        sample_rate: sample_rate as f64,
    };
    let agc = AgcParams {
        on: true,
        use_hang: false,
        threshold_db: -100.0,
        manual_gain_db: 0.0,
        slope_db: 0.0,
        decay_ms: 500.0,
        sample_rate: sample_rate as f64,
    };
    let pipeline_config = PipelineConfig {
        device,
        channel,
        agc,
        demod: DemodKind::Ssb,
        squelch_db: -150.0,
        output_rate: 48_000,
        dynamic_range_db: 100,
        fft_size: 512,
        fft_rate_hz: 10,
    };

    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Box::new(SharedSink(Arc::clone(&captured)));
    let mut scheduler = Scheduler::start(pipeline_config, path.to_str().unwrap(), sink)
        .expect("scheduler should start against the file backend");

    std::thread::sleep(Duration::from_millis(400));
    scheduler.stop().unwrap();
    let _ = std::fs::remove_file(&path);

    let pcm = captured.lock().unwrap();
    assert!(!pcm.is_empty(), "expected some demodulated audio");
    let tail: Vec<f32> = pcm[pcm.len() / 2..]
        .iter()
        .map(|&s| s as f32 / 32768.0)
        .collect();
    let on_tone = goertzel_power(&tail, 500.0, 48_000.0);
    let off_tone = goertzel_power(&tail, 2_000.0, 48_000.0);
    assert!(
        on_tone > off_tone * 5.0,
        "expected a dominant 500Hz bin: on={on_tone} off={off_tone}"
    );
}
