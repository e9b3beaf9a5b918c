//! Common HID plumbing for the collective controller
//!
//! This crate holds everything between the report encoder and the wire:
//! the [`ReportSink`] / [`HidLocator`] transport seam, a scanner for HID
//! report descriptors, allocation-free report parsing and writing, an
//! in-memory mock transport and the Linux USB gadget (`/dev/hidgN`) backend.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod descriptor;
pub mod device_info;
pub mod gadget;
pub mod hid_traits;
pub mod report_parser;

pub use descriptor::*;
pub use device_info::*;
pub use gadget::{GadgetDevice, GadgetLocator};
pub use hid_traits::*;
pub use report_parser::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("No HID collection with usage page {usage_page:#04x} and usage {usage:#04x}")]
    DeviceNotFound { usage_page: u16, usage: u16 },

    #[error("Short write: sent {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("Invalid report format: {0}")]
    InvalidReport(String),

    #[error("Invalid report descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;
