// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Command-line front end. A minimum ambient surface for a runnable binary
//! in place of the GUI the distilled spec assumed and explicitly excluded:
//! overrides for the device and config path, a log-level override, and a
//! bounded-duration smoke-test mode for exercising the pipeline headlessly.

use std::path::PathBuf;

use clap::Parser;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - SDR receive pipeline");

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
pub struct Cli {
    /// Path to configuration file, overriding the CWD/XDG/etc search.
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Device backend to use: a vendor id ("rtlsdr", "airspy", ...), "stdin",
    /// or a WAV file path, overriding `[sdr_input].device_type`.
    #[arg(long = "device", short = 'd')]
    pub device: Option<String>,

    /// Tuned frequency in Hz, overriding `[sdr_input].frequency`.
    #[arg(long = "freq", short = 'f')]
    pub frequency: Option<u64>,

    /// Log level (error, warn, info, debug, trace), overriding `[app].log_level`.
    #[arg(long = "log-level", short = 'L')]
    pub log_level: Option<String>,

    /// Run for this many seconds, then stop and exit, instead of running
    /// until interrupted. Used for the headless end-to-end smoke tests.
    #[arg(long = "once", value_name = "SECONDS")]
    pub once: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_once_duration() {
        let cli = Cli::parse_from(["sdrrx", "--once", "5"]);
        assert_eq!(cli.once, Some(5));
    }

    #[test]
    fn parses_device_override() {
        let cli = Cli::parse_from(["sdrrx", "-d", "rtlsdr"]);
        assert_eq!(cli.device.as_deref(), Some("rtlsdr"));
    }
}
