// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Spectrum cadence: at a 25Hz FFT rate a new frame should not be ready
//! after only 20ms, but should be ready by 40ms.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use num_complex::Complex;
use sdrrx_app::FftThread;

#[test]
fn frame_cadence_matches_configured_rate() {
    let fft_size = 512;
    let mut fft = FftThread::start(fft_size, 25, fft_size * 8).expect("fft thread should start");

    let stop = Arc::new(AtomicBool::new(false));
    let feeder_stop = Arc::clone(&stop);
    let input = fft.input_handle();
    let feeder = std::thread::spawn(move || {
        let tone: Vec<Complex<f32>> = (0..64)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * 1_000.0 * i as f64 / 48_000.0;
                Complex::new(theta.cos() as f32, theta.sin() as f32)
            })
            .collect();
        while !feeder_stop.load(Ordering::Relaxed) {
            if let Ok(mut guard) = input.lock() {
                guard.write(&tone);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    });

    // Drain the first frame, which can latch almost immediately after start
    // (the run loop treats "just started" as "a period overdue").
    let mut waited = Duration::from_millis(0);
    while fft.get_output().is_none() && waited < Duration::from_millis(200) {
        std::thread::sleep(Duration::from_millis(2));
        waited += Duration::from_millis(2);
    }
    assert!(waited < Duration::from_millis(200), "never got an initial frame");

    std::thread::sleep(Duration::from_millis(20));
    assert!(
        fft.get_output().is_none(),
        "a new frame should not be ready only 20ms after the last one at 25Hz"
    );

    std::thread::sleep(Duration::from_millis(25));
    assert!(
        fft.get_output().is_some(),
        "a new frame should be ready by ~40ms after the last one at 25Hz"
    );

    stop.store(true, Ordering::Relaxed);
    feeder.join().unwrap();
    fft.stop();
}
