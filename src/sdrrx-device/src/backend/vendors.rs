// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Static [`VendorSpec`] tables for each hardware backend. Shared object
//! candidates follow each vendor's published runtime name; symbol names
//! follow this harness's generic open/close/start/stop/read/set_*
//! convention (see `dynlib.rs` module doc) rather than each SDK's real,
//! mutually incompatible call signatures.

use crate::dynlib::VendorSpec;
use crate::format::SampleFormat;

pub static RTLSDR: VendorSpec = VendorSpec {
    type_id: "rtlsdr",
    library_candidates: &["librtlsdr.so.0", "librtlsdr.so", "librtlsdr.dylib"],
    open_symbol: "rtlsdr_open",
    close_symbol: "rtlsdr_close",
    start_symbol: "rtlsdr_start_rx",
    stop_symbol: "rtlsdr_stop_rx",
    read_symbol: "rtlsdr_read_sync",
    set_freq_symbol: "rtlsdr_set_center_freq",
    set_rate_symbol: "rtlsdr_set_sample_rate",
    set_bw_symbol: "rtlsdr_set_tuner_bandwidth",
    set_gain_symbol: "rtlsdr_set_tuner_gain",
    format: SampleFormat::U8,
    supported_rates: &[250_000, 1_024_000, 1_536_000, 1_920_000, 2_048_000, 2_400_000],
    freq_range: (24_000_000, 1_766_000_000),
};

pub static AIRSPY: VendorSpec = VendorSpec {
    type_id: "airspy",
    library_candidates: &["libairspy.so.0", "libairspy.so", "libairspy.dylib"],
    open_symbol: "airspy_open",
    close_symbol: "airspy_close",
    start_symbol: "airspy_start_rx",
    stop_symbol: "airspy_stop_rx",
    read_symbol: "airspy_read_sync",
    set_freq_symbol: "airspy_set_freq",
    set_rate_symbol: "airspy_set_samplerate",
    set_bw_symbol: "airspy_set_bandwidth",
    set_gain_symbol: "airspy_set_sensitivity_gain",
    format: SampleFormat::F32,
    supported_rates: &[2_500_000, 10_000_000],
    freq_range: (24_000_000, 1_800_000_000),
};

pub static AIRSPY_MINI: VendorSpec = VendorSpec {
    type_id: "airspymini",
    library_candidates: &["libairspy.so.0", "libairspy.so", "libairspy.dylib"],
    open_symbol: "airspy_open",
    close_symbol: "airspy_close",
    start_symbol: "airspy_start_rx",
    stop_symbol: "airspy_stop_rx",
    read_symbol: "airspy_read_sync",
    set_freq_symbol: "airspy_set_freq",
    set_rate_symbol: "airspy_set_samplerate",
    set_bw_symbol: "airspy_set_bandwidth",
    set_gain_symbol: "airspy_set_sensitivity_gain",
    format: SampleFormat::S16,
    supported_rates: &[3_000_000, 6_000_000],
    freq_range: (24_000_000, 1_750_000_000),
};

pub static SDRIQ: VendorSpec = VendorSpec {
    type_id: "sdriq",
    library_candidates: &["libftdi1.so.2", "libftdi1.so", "libftdi1.dylib"],
    open_symbol: "sdriq_open",
    close_symbol: "sdriq_close",
    start_symbol: "sdriq_start_rx",
    stop_symbol: "sdriq_stop_rx",
    read_symbol: "sdriq_read_sync",
    set_freq_symbol: "sdriq_set_freq",
    set_rate_symbol: "sdriq_set_samplerate",
    set_bw_symbol: "sdriq_set_bandwidth",
    set_gain_symbol: "sdriq_set_gain",
    format: SampleFormat::S16,
    supported_rates: &[8_138, 16_277, 37_037, 55_556, 111_111, 158_730, 196_078],
    freq_range: (500, 33_000_000),
};

pub static BLADERF: VendorSpec = VendorSpec {
    type_id: "bladerf",
    library_candidates: &["libbladeRF.so.2", "libbladeRF.so", "libbladeRF.dylib"],
    open_symbol: "bladerf_open",
    close_symbol: "bladerf_close",
    start_symbol: "bladerf_enable_module",
    stop_symbol: "bladerf_disable_module",
    read_symbol: "bladerf_sync_rx",
    set_freq_symbol: "bladerf_set_frequency",
    set_rate_symbol: "bladerf_set_sample_rate",
    set_bw_symbol: "bladerf_set_bandwidth",
    set_gain_symbol: "bladerf_set_gain",
    format: SampleFormat::S12,
    supported_rates: &[520_834, 1_000_000, 10_000_000, 40_000_000],
    freq_range: (47_000_000, 6_000_000_000),
};

pub static LIMESDR: VendorSpec = VendorSpec {
    type_id: "limesdr",
    library_candidates: &["libLimeSuite.so.20", "libLimeSuite.so", "libLimeSuite.dylib"],
    open_symbol: "lime_open",
    close_symbol: "lime_close",
    start_symbol: "lime_start_stream",
    stop_symbol: "lime_stop_stream",
    read_symbol: "lime_recv_stream",
    set_freq_symbol: "lime_set_rf_freq",
    set_rate_symbol: "lime_set_sample_rate",
    set_bw_symbol: "lime_set_lpf_bandwidth",
    set_gain_symbol: "lime_set_rx_gain",
    format: SampleFormat::S16,
    supported_rates: &[1_000_000, 5_000_000, 10_000_000, 30_000_000, 61_440_000],
    freq_range: (100_000, 3_800_000_000),
};

pub static SDRPLAY: VendorSpec = VendorSpec {
    type_id: "sdrplay",
    library_candidates: &["libmirsdrapi-rsp.so.3", "libmirsdrapi-rsp.so"],
    open_symbol: "sdrplay_open",
    close_symbol: "sdrplay_close",
    start_symbol: "sdrplay_stream_init",
    stop_symbol: "sdrplay_stream_uninit",
    read_symbol: "sdrplay_read_sync",
    set_freq_symbol: "sdrplay_set_rf_freq",
    set_rate_symbol: "sdrplay_set_fs",
    set_bw_symbol: "sdrplay_set_bw",
    set_gain_symbol: "sdrplay_set_gr",
    format: SampleFormat::U16Offset,
    supported_rates: &[2_000_000, 6_000_000, 8_000_000, 10_000_000],
    freq_range: (1_000_000, 2_000_000_000),
};
