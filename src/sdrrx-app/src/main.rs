// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use sdrrx_app::cli::Cli;
use sdrrx_app::config::{AppConfig, ConfigFile};
use sdrrx_app::logging::init_logging;
use sdrrx_app::scheduler::{PipelineConfig, Scheduler, WriterSink};
use sdrrx_core::{SdrError, SdrResult};

/// The audio sink is fixed at 48 kHz mono 16-bit PCM.
const OUTPUT_RATE_HZ: u32 = 48_000;

fn main() -> SdrResult<()> {
    let cli = Cli::parse();

    let (mut config, config_path) = if let Some(ref path) = cli.config {
        (
            AppConfig::load_from_file(path).map_err(|e| SdrError::other(e.to_string()))?,
            Some(path.clone()),
        )
    } else {
        AppConfig::load_from_default_paths().map_err(|e| SdrError::other(e.to_string()))?
    };

    let log_level = cli.log_level.clone().or_else(|| config.app.log_level.clone());
    init_logging(log_level.as_deref());

    if let Some(path) = &config_path {
        info!("loaded configuration from {}", path.display());
    } else {
        info!("no configuration file found, using defaults");
    }

    if let Some(ref device) = cli.device {
        config.switch_device_type(device);
    }
    if let Some(freq) = cli.frequency {
        config.sdr_input.device.frequency = freq;
    }

    let device_type = config.sdr_input.device.device_type.clone();
    let pipeline_config = PipelineConfig {
        device: config.sdr_input.device.clone(),
        channel: config.sdr_input.filter,
        agc: config.sdr_input.agc,
        demod: config.sdr_input.demod,
        squelch_db: config.sdr_input.squelch_db,
        output_rate: OUTPUT_RATE_HZ,
        dynamic_range_db: 100,
        fft_size: config.app.fft.size,
        fft_rate_hz: config.app.fft.rate_hz,
    };

    let sink = Box::new(WriterSink::new(io::stdout()));
    let mut scheduler = Scheduler::start(pipeline_config, &device_type, sink)?;

    match cli.once {
        Some(secs) => {
            info!("running for {secs}s then stopping");
            std::thread::sleep(Duration::from_secs(secs));
        }
        None => {
            let (tx, rx) = std::sync::mpsc::channel();
            ctrlc::set_handler(move || {
                let _ = tx.send(());
            })
            .expect("failed to install Ctrl+C handler");
            let _ = rx.recv();
            info!("interrupt received, shutting down");
        }
    }

    scheduler.stop()
}
