// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Per-vendor backend definitions and the type-id factory.

mod file;
mod stdin;
mod vendors;

use sdrrx_core::{SdrError, SdrResult};

use crate::device::IqDevice;
use crate::dynlib::DynlibDevice;

pub use file::FileDevice;
pub use stdin::StdinDevice;
pub use vendors::{
    AIRSPY, AIRSPY_MINI, BLADERF, LIMESDR, RTLSDR, SDRIQ, SDRPLAY,
};

/// Instantiates the backend named by `type_id`. Vendor names dispatch to a
/// [`DynlibDevice`] configured with that vendor's [`crate::dynlib::VendorSpec`];
/// `"stdin"` reads raw IQ from standard input; anything else is treated as a
/// file path for offline/file-backed capture.
pub fn create(type_id: &str) -> SdrResult<Box<dyn IqDevice>> {
    match type_id {
        "rtlsdr" => Ok(Box::new(DynlibDevice::new(&RTLSDR))),
        "airspy" => Ok(Box::new(DynlibDevice::new(&AIRSPY))),
        "airspymini" => Ok(Box::new(DynlibDevice::new(&AIRSPY_MINI))),
        "sdriq" => Ok(Box::new(DynlibDevice::new(&SDRIQ))),
        "bladerf" => Ok(Box::new(DynlibDevice::new(&BLADERF))),
        "limesdr" => Ok(Box::new(DynlibDevice::new(&LIMESDR))),
        "sdrplay" => Ok(Box::new(DynlibDevice::new(&SDRPLAY))),
        "stdin" => Ok(Box::new(StdinDevice::new())),
        "" => Err(SdrError::invalid("empty device type")),
        path => Ok(Box::new(FileDevice::new(path))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vendor_ids_resolve() {
        for id in [
            "rtlsdr",
            "airspy",
            "airspymini",
            "sdriq",
            "bladerf",
            "limesdr",
            "sdrplay",
            "stdin",
        ] {
            let device = create(id).unwrap();
            if id != "stdin" {
                assert_eq!(device.type_id(), id);
            }
        }
    }

    #[test]
    fn unknown_id_is_treated_as_a_file_path() {
        let device = create("/tmp/some-capture.iq").unwrap();
        assert_eq!(device.type_id(), "file");
    }

    #[test]
    fn empty_type_id_is_rejected() {
        assert!(create("").is_err());
    }
}
