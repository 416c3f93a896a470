// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! File-backend boundary scenarios: ring overflow counting, rejecting a
//! sample-rate change while running, and an oversized read returning zero
//! without advancing the ring.

use std::path::PathBuf;
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};
use num_complex::Complex;
use sdrrx_device::backend;

fn write_tone_wav(path: &PathBuf, sample_rate: u32, n: usize) {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..n {
        let theta = 2.0 * std::f64::consts::PI * 400.0 * i as f64 / sample_rate as f64;
        writer
            .write_sample((theta.cos() * 10_000.0) as i16)
            .unwrap();
        writer
            .write_sample((theta.sin() * 10_000.0) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn producing_far_more_than_ring_capacity_counts_overruns() {
    // Ring capacity is half a second of samples; a sample rate of 8kHz gives
    // a 4000-sample ring, and the fixture below is five times that, so the
    // unthrottled producer thread is certain to wrap the ring before the
    // test ever reads from it.
    let sample_rate = 8_000u32;
    let path = std::env::temp_dir().join(format!("sdrrx-overflow-fixture-{}.wav", std::process::id()));
    write_tone_wav(&path, sample_rate, 20_000);

    let mut device = backend::create(path.to_str().unwrap()).unwrap();
    device.load_driver().unwrap();
    device.open().unwrap();
    device.start_rx().unwrap();

    // Give the producer thread time to run the whole file through without
    // the test draining it, so the ring has to overwrite old data.
    std::thread::sleep(Duration::from_millis(300));

    let stats = device.stats();
    let _ = std::fs::remove_file(&path);
    assert!(stats.rx_samples > 0, "expected some samples produced");
    assert!(
        stats.rx_overruns > 0,
        "expected ring overruns from an undrained producer: {stats:?}"
    );
    assert!(device.available_samples() <= (sample_rate as usize) / 2 + 1);
}

#[test]
fn sample_rate_change_is_rejected_on_file_backend() {
    let path = std::env::temp_dir().join(format!("sdrrx-rate-fixture-{}.wav", std::process::id()));
    write_tone_wav(&path, 48_000, 100);

    let mut device = backend::create(path.to_str().unwrap()).unwrap();
    device.load_driver().unwrap();
    device.open().unwrap();
    device.start_rx().unwrap();

    assert!(
        device.set_rx_sample_rate(44_100).is_err(),
        "file backend's rate is fixed by the capture and must reject changes"
    );

    device.stop_rx().unwrap();
    let _ = std::fs::remove_file(&path);
}

#[test]
fn oversized_read_returns_zero_without_advancing() {
    let path = std::env::temp_dir().join(format!("sdrrx-empty-read-fixture-{}.wav", std::process::id()));
    write_tone_wav(&path, 48_000, 10);

    let mut device = backend::create(path.to_str().unwrap()).unwrap();
    device.load_driver().unwrap();
    device.open().unwrap();

    let mut out = vec![Complex::new(0.0f32, 0.0); 10_000];
    let n = device.read_samples(&mut out).unwrap();
    assert_eq!(n, 0, "no producer has run yet, nothing should be available");

    let _ = std::fs::remove_file(&path);
}
