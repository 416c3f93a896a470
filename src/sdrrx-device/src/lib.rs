// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Vendor-agnostic SDR device abstraction: the [`IqDevice`] capability
//! trait, the `{unloaded→loaded→open→running}` state machine, native
//! sample-format normalization, and the per-vendor backends reachable
//! through [`backend::create`].

pub mod backend;
pub mod device;
pub mod dynlib;
pub mod format;

pub use backend::create;
pub use device::{DeviceState, GainMode, IqDevice};
pub use dynlib::{DynlibDevice, VendorSpec};
pub use format::SampleFormat;
