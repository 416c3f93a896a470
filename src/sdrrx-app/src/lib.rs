// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Library half of the `sdrrx` binary: configuration, logging, the CLI
//! definition, the spectrum thread and the pipeline scheduler. Split out
//! from `main.rs` so integration tests can drive the scheduler directly
//! against a synthetic device, the same separation `trx-server`'s binary
//! keeps from its `config`/`rig_task` modules.

pub mod cli;
pub mod config;
pub mod fft_thread;
pub mod logging;
pub mod scheduler;

pub use cli::Cli;
pub use config::{AppConfig, AppSection, ConfigError, ConfigFile, SdrInputSection};
pub use fft_thread::FftThread;
pub use scheduler::{AudioSink, PipelineConfig, Scheduler, SchedulerStats, WriterSink};
