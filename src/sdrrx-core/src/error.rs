// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use thiserror::Error;

/// Error taxonomy shared by every layer of the receive pipeline.
///
/// Each layer reports the most specific variant it has. The scheduler logs
/// and aborts the start sequence on any of these during startup, but treats
/// steady-state device read errors as recoverable unless they repeat.
#[derive(Debug, Clone, Error)]
pub enum SdrError {
    /// Caller passed a value outside the contract (e.g. filter cutoffs
    /// crossing, `low_cut >= high_cut`).
    #[error("invalid argument: {0}")]
    Invalid(String),

    /// Value is valid in type but unsupported by the hardware (frequency
    /// out of tuner range, sample rate not in the enumerated set).
    #[error("value out of range: {0}")]
    Range(String),

    /// Operation would conflict with the current lifecycle state (open
    /// when already open, rate change while running).
    #[error("device busy: {0}")]
    Busy(String),

    /// Device or file absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Vendor library reported a failure when opening.
    #[error("device open failed: {0}")]
    Open(String),

    /// Shared library missing or a required symbol could not be resolved.
    #[error("library load failed: {0}")]
    Lib(String),

    /// Capability not supported by this backend.
    #[error("not available: {0}")]
    NotAvail(String),

    /// Unspecified failure reported by the vendor driver.
    #[error("device error: {0}")]
    Other(String),
}

pub type SdrResult<T> = Result<T, SdrError>;

impl SdrError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open(msg.into())
    }

    pub fn lib(msg: impl Into<String>) -> Self {
        Self::Lib(msg.into())
    }

    pub fn not_avail(msg: impl Into<String>) -> Self {
        Self::NotAvail(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_message() {
        let e = SdrError::range("frequency 10 Hz below tuner minimum");
        assert!(e.to_string().contains("10 Hz"));
    }
}
